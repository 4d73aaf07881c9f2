//! Tubely Processing Library
//!
//! Turns an uploaded byte stream into a stored, streaming-friendly asset:
//! upload policy, local staging, ffprobe geometry extraction, ffmpeg
//! faststart remux and the ingest pipeline tying them to storage.

pub mod command;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod policy;
pub mod probe;
pub mod staging;

pub use error::ProcessingError;
pub use normalize::StreamNormalizer;
pub use pipeline::{IngestPipeline, IngestedThumbnail, IngestedVideo};
pub use policy::{normalize_content_type, MediaType, UploadPolicy};
pub use probe::{GeometryProber, StreamGeometry};
pub use staging::{BodyLimitExceeded, StagedFile, Stager};
