use crate::keys::validate_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

/// Container name reported by local storage when none is configured.
pub const DEFAULT_LOCAL_CONTAINER: &str = "local";

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    container: String,
    signing_key: Option<Vec<u8>>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/tubely/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8091/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            container: DEFAULT_LOCAL_CONTAINER.to_string(),
            signing_key: None,
        })
    }

    /// Name reported as the container of stored objects.
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    /// Sign presigned URLs with `secret`. Without a key, presigned URLs are
    /// plain public URLs.
    pub fn with_signing_key(mut self, secret: impl AsRef<[u8]>) -> Self {
        self.signing_key = Some(secret.as_ref().to_vec());
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys that could escape the base storage directory.
    pub fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if !validate_key(storage_key) {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(storage_key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    fn sign(secret: &[u8], key: &str, expires: u64) -> StorageResult<Hmac<Sha256>> {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;
        mac.update(key.as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Check the `expires`/`signature` pair of a presigned URL for `key`.
    pub fn verify_signature(&self, key: &str, expires: u64, signature: &str) -> StorageResult<()> {
        let secret = self
            .signing_key
            .as_deref()
            .ok_or(StorageError::InvalidSignature)?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        if now > expires {
            return Err(StorageError::InvalidSignature);
        }

        let tag = hex::decode(signature).map_err(|_| StorageError::InvalidSignature)?;
        Self::sign(secret, key, expires)?
            .verify_slice(&tag)
            .map_err(|_| StorageError::InvalidSignature)
    }

    /// Open a stored object for reading.
    pub async fn open(&self, key: &str) -> StorageResult<fs::File> {
        let path = self.key_to_path(key)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    async fn copy_into(source: &Path, target: &Path) -> std::io::Result<u64> {
        let mut input = fs::File::open(source).await?;
        let mut output = fs::File::create(target).await?;
        let size = tokio::io::copy(&mut input, &mut output).await?;
        output.flush().await?;
        output.sync_all().await?;
        Ok(size)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn container(&self) -> &str {
        &self.container
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        _content_type: &str,
        deadline: Instant,
    ) -> StorageResult<u64> {
        let target = self.key_to_path(key)?;
        self.ensure_parent_dir(&target).await?;

        let start = std::time::Instant::now();

        let error = match tokio::time::timeout_at(deadline, Self::copy_into(path, &target)).await {
            Ok(Ok(size)) => {
                tracing::info!(
                    path = %target.display(),
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage upload successful"
                );
                return Ok(size);
            }
            Ok(Err(e)) => StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                target.display(),
                e
            )),
            Err(_) => StorageError::DeadlineExceeded(key.to_string()),
        };

        // Never leave a partially written object behind.
        let _ = fs::remove_file(&target).await;

        tracing::error!(
            error = %error,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload failed"
        );
        Err(error)
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        self.key_to_path(key)?;
        let url = self.public_url(key);

        let Some(secret) = self.signing_key.as_deref() else {
            return Ok(url);
        };

        let expires = SystemTime::now()
            .checked_add(expires_in)
            .unwrap_or(UNIX_EPOCH)
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let signature = hex::encode(Self::sign(secret, key, expires)?.finalize().into_bytes());

        Ok(format!("{}?expires={}&signature={}", url, expires, signature))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
