//! Data models for the application
//!
//! Video records and the value types the ingest pipeline derives from them.

mod orientation;
mod video;

pub use orientation::*;
pub use video::*;
