//! Upload policy: which content types each flow accepts and how large the
//! file may be.

use crate::error::ProcessingError;

/// Room for multipart boundaries and part headers on top of the file ceiling.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Allow-listed media types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    VideoMp4,
    ImageJpeg,
    ImagePng,
}

impl MediaType {
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::VideoMp4 => "video/mp4",
            MediaType::ImageJpeg => "image/jpeg",
            MediaType::ImagePng => "image/png",
        }
    }

    /// File extension used in object keys
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::VideoMp4 => "mp4",
            MediaType::ImageJpeg => "jpg",
            MediaType::ImagePng => "png",
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "video/mp4" => Some(MediaType::VideoMp4),
            "image/jpeg" => Some(MediaType::ImageJpeg),
            "image/png" => Some(MediaType::ImagePng),
            _ => None,
        }
    }
}

/// Strip parameters from a Content-Type value and normalize case
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Per-flow upload rules
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    /// Multipart field carrying the file
    pub field_name: &'static str,
    /// Largest accepted file, in bytes (inclusive)
    pub max_bytes: u64,
    pub allowed: &'static [MediaType],
}

impl UploadPolicy {
    pub const VIDEO: UploadPolicy = UploadPolicy {
        field_name: "video",
        max_bytes: 1 << 30,
        allowed: &[MediaType::VideoMp4],
    };

    pub const THUMBNAIL: UploadPolicy = UploadPolicy {
        field_name: "thumbnail",
        max_bytes: 10 << 20,
        allowed: &[MediaType::ImageJpeg, MediaType::ImagePng],
    };

    /// Validate a declared content type against the allow-list.
    ///
    /// A missing content type is rejected like any other unlisted one.
    pub fn accept(&self, declared: Option<&str>) -> Result<MediaType, ProcessingError> {
        let declared = declared.unwrap_or_default();
        let normalized = normalize_content_type(declared);
        MediaType::from_mime(&normalized)
            .filter(|media_type| self.allowed.contains(media_type))
            .ok_or_else(|| {
                ProcessingError::UnsupportedMediaType(if normalized.is_empty() {
                    "(none)".to_string()
                } else {
                    normalized
                })
            })
    }

    /// HTTP body limit for a request carrying one such file
    pub fn body_limit(&self) -> usize {
        (self.max_bytes + MULTIPART_OVERHEAD_BYTES) as usize
    }
}
