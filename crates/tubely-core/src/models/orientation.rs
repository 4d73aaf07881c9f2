use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;

pub const ASPECT_RATIO_16_9: f64 = 16.0 / 9.0;
pub const ASPECT_RATIO_9_16: f64 = 9.0 / 16.0;

/// Maximum distance from a reference ratio still considered a match.
pub const ASPECT_RATIO_TOLERANCE: f64 = 0.01;

/// Visual orientation of a video, derived from its width/height ratio.
///
/// Only used as the first segment of a video object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify a width/height ratio.
    ///
    /// Non-finite ratios fall through to [`Orientation::Other`].
    pub fn classify(ratio: f64) -> Self {
        if (ratio - ASPECT_RATIO_16_9).abs() <= ASPECT_RATIO_TOLERANCE {
            Orientation::Landscape
        } else if (ratio - ASPECT_RATIO_9_16).abs() <= ASPECT_RATIO_TOLERANCE {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
