//! Tubely Storage Library
//!
//! Storage abstraction over the object store holding normalized videos, plus
//! the local filesystem backend used for thumbnails and development.
//!
//! # Storage key format
//!
//! - **Videos**: `{orientation}/{token}.{ext}`
//! - **Thumbnails**: `{token}.{ext}`
//!
//! `token` is 32 random bytes, base64 URL-safe without padding. Keys never
//! contain `..` or a leading `/`. Key generation lives in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, StorageSet};
pub use keys::ObjectKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
