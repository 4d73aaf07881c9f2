//! Stream geometry extraction with ffprobe

use std::ffi::OsStr;
use std::path::Path;

use serde::Deserialize;
use tokio::time::Instant;
use tubely_core::models::Orientation;

use crate::command::run_tool;
use crate::error::ProcessingError;

/// Width and height of the first video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    pub width: u32,
    pub height: u32,
}

impl StreamGeometry {
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::classify(self.ratio())
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
///
/// Audio and data streams carry no dimensions and are skipped.
pub fn parse_probe_output(stdout: &[u8]) -> Result<StreamGeometry, ProcessingError> {
    let probe: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|e| ProcessingError::ToolFailed {
            tool: GeometryProber::TOOL,
            message: format!("unreadable output: {}", e),
        })?;

    let (width, height) = probe
        .streams
        .iter()
        .find_map(|stream| stream.width.zip(stream.height))
        .ok_or_else(|| ProcessingError::ContentInvalid("No video stream found".to_string()))?;

    if height == 0 {
        return Err(ProcessingError::ContentInvalid(
            "Video stream reports zero height".to_string(),
        ));
    }

    Ok(StreamGeometry { width, height })
}

pub struct GeometryProber {
    ffprobe_path: String,
}

impl GeometryProber {
    const TOOL: &'static str = "ffprobe";

    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    #[tracing::instrument(skip(self, deadline), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn probe(
        &self,
        path: &Path,
        deadline: Instant,
    ) -> Result<StreamGeometry, ProcessingError> {
        let args: [&OsStr; 6] = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_streams"),
            path.as_os_str(),
        ];
        let stdout = run_tool(Self::TOOL, &self.ffprobe_path, args, deadline).await?;
        let geometry = parse_probe_output(&stdout)?;

        tracing::info!(
            width = geometry.width,
            height = geometry.height,
            orientation = %geometry.orientation(),
            "Video geometry probed"
        );
        Ok(geometry)
    }
}
