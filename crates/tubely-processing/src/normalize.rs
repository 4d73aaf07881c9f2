//! Faststart remux with ffmpeg
//!
//! Moves the MP4 index to the front of the file so playback can begin before
//! the download completes. Streams are copied, never re-encoded.

use std::ffi::{OsStr, OsString};

use tokio::time::Instant;

use crate::command::run_tool;
use crate::error::ProcessingError;
use crate::staging::StagedFile;

/// Suffix appended to the input path to name the remuxed output.
pub const OUTPUT_SUFFIX: &str = ".processing";

pub struct StreamNormalizer {
    ffmpeg_path: String,
}

impl StreamNormalizer {
    const TOOL: &'static str = "ffmpeg";

    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    #[tracing::instrument(skip(self, input, deadline), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    pub async fn faststart(
        &self,
        input: &StagedFile,
        deadline: Instant,
    ) -> Result<StagedFile, ProcessingError> {
        let mut output_path = OsString::from(input.path().as_os_str());
        output_path.push(OUTPUT_SUFFIX);
        // Owned before ffmpeg runs so a partial output is removed too.
        let output = StagedFile::adopt(output_path)?;

        let args: [&OsStr; 10] = [
            OsStr::new("-y"),
            OsStr::new("-i"),
            input.path().as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("faststart"),
            OsStr::new("-f"),
            OsStr::new("mp4"),
            output.path().as_os_str(),
        ];
        run_tool(Self::TOOL, &self.ffmpeg_path, args, deadline).await?;

        match tokio::fs::metadata(output.path()).await {
            Ok(meta) if meta.is_file() => {
                tracing::info!(size_bytes = meta.len(), "Video remuxed for faststart");
                Ok(output)
            }
            _ => Err(ProcessingError::ToolFailed {
                tool: Self::TOOL,
                message: "no output file produced".to_string(),
            }),
        }
    }
}
