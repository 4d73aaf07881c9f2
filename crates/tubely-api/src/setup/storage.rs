//! Storage setup and initialization

use anyhow::{Context, Result};
use tubely_core::Config;
use tubely_storage::{create_storage, StorageSet};

/// Build the media and assets stores selected by configuration.
pub async fn setup_storage(config: &Config) -> Result<StorageSet> {
    tracing::info!(backend = %config.storage_backend(), "Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage")?;

    tracing::info!(
        backend = %storage.media.backend_type(),
        container = %storage.media.container(),
        assets = %storage.assets.base_path().display(),
        serves_media = storage.local_media.is_some(),
        "Storage initialized successfully"
    );
    Ok(storage)
}
