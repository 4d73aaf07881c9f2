//! Database repositories for data access layer
//!
//! The ingest service only reads and updates existing video records; creation
//! and deletion belong to other services sharing the same table.

pub mod video;

#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::InMemoryVideoRepository;
pub use video::{PgVideoRepository, VideoRepository, VideoRow};
