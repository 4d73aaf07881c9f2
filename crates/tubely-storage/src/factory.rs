#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use std::sync::Arc;
use tubely_core::Config;

/// Storage handles needed by the API.
#[derive(Clone)]
pub struct StorageSet {
    /// Destination of normalized videos.
    pub media: Arc<dyn Storage>,
    /// Set when videos are kept on the local filesystem and served by the API.
    #[cfg(feature = "storage-local")]
    pub local_media: Option<Arc<LocalStorage>>,
    /// Thumbnail directory served under `/assets`.
    #[cfg(feature = "storage-local")]
    pub assets: Arc<LocalStorage>,
}

/// Create the storage backends based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<StorageSet> {
    #[cfg(feature = "storage-local")]
    let assets = Arc::new(
        LocalStorage::new(
            config.assets_root().clone(),
            config.assets_base_url().to_string(),
        )
        .await?,
    );

    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let storage = S3Storage::new(bucket, region, endpoint)?;
            tracing::info!(backend = %StorageBackend::S3, container = %storage.container(), "Storage initialized");
            Ok(StorageSet {
                media: Arc::new(storage),
                #[cfg(feature = "storage-local")]
                local_media: None,
                #[cfg(feature = "storage-local")]
                assets,
            })
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .unwrap_or_else(|| format!("http://localhost:{}/media", config.server_port()));

            let storage = Arc::new(
                LocalStorage::new(base_path, base_url)
                    .await?
                    .with_signing_key(config.url_signing_secret()),
            );
            tracing::info!(backend = %StorageBackend::Local, path = %storage.base_path().display(), "Storage initialized");
            Ok(StorageSet {
                media: storage.clone(),
                local_media: Some(storage),
                assets,
            })
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
