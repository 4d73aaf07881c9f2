//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tubely_core::AppError;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Upload deadline exceeded for {0}")]
    DeadlineExceeded(String),

    #[error("Invalid or expired URL signature")]
    InvalidSignature,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("Object {} not found", key)),
            StorageError::InvalidKey(msg) => AppError::BadRequest(msg),
            StorageError::InvalidSignature => {
                AppError::Unauthorized("Invalid or expired URL signature".to_string())
            }
            other => AppError::StorageFailure(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// ingest pipeline never depends on a concrete backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Name of the container (bucket) objects are written to.
    fn container(&self) -> &str;

    /// Stream a local file to `key`, tagging it with `content_type`.
    ///
    /// Makes a single attempt. The upload is abandoned once `deadline` passes.
    /// Returns the number of bytes written.
    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
        deadline: Instant,
    ) -> StorageResult<u64>;

    /// Generate a time-limited GET URL for `key`.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Unsigned URL of an object, for publicly served containers.
    fn public_url(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
