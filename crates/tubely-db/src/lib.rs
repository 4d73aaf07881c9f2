//! Tubely database layer
//!
//! Repositories over the `videos` table.

pub mod db;

pub use db::{PgVideoRepository, VideoRepository, VideoRow};

#[cfg(any(test, feature = "test-helpers"))]
pub use db::InMemoryVideoRepository;
