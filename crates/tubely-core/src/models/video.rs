use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Location of a normalized video object: the store container (bucket) and
/// the object key inside it.
///
/// Persisted as `"{container},{key}"`. Containers never contain a comma, so
/// parsing splits on the first one and keys may contain commas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub container: String,
    pub key: String,
}

impl VideoRef {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Result<Self, AppError> {
        let container = container.into();
        let key = key.into();
        if container.is_empty() || container.contains(',') {
            return Err(AppError::Internal(format!(
                "Invalid storage container name: {:?}",
                container
            )));
        }
        if key.is_empty() {
            return Err(AppError::Internal("Empty object key".to_string()));
        }
        Ok(Self { container, key })
    }

    /// Persisted single-string form.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl Display for VideoRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{},{}", self.container, self.key)
    }
}

impl FromStr for VideoRef {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (container, key) = s
            .split_once(',')
            .ok_or_else(|| AppError::Internal(format!("Malformed video reference: {}", s)))?;
        VideoRef::new(container, key)
    }
}

/// Video record as stored in the metadata store.
///
/// `video_ref`, when present, always points at a normalized object.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
    pub video_ref: Option<VideoRef>,
}

impl Video {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Video as returned to clients. `video_url` holds a time-limited signed URL,
/// never the stored reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub user_id: Uuid,
}

impl VideoResponse {
    pub fn new(video: Video, signed_video_url: Option<String>) -> Self {
        Self {
            id: video.id,
            created_at: video.created_at,
            updated_at: video.updated_at,
            title: video.title,
            description: video.description,
            thumbnail_url: video.thumbnail_url,
            video_url: signed_video_url,
            user_id: video.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_ref_encodes_container_then_key() {
        let video_ref = VideoRef::new("tubely-videos", "landscape/abc.mp4").unwrap();
        assert_eq!(video_ref.encode(), "tubely-videos,landscape/abc.mp4");
    }

    #[test]
    fn test_video_ref_parse_keeps_commas_in_key() {
        let video_ref = VideoRef::new("bucket", "other/a,b,c.mp4").unwrap();
        let parsed: VideoRef = video_ref.encode().parse().unwrap();
        assert_eq!(parsed, video_ref);
        assert_eq!(parsed.key, "other/a,b,c.mp4");
    }

    #[test]
    fn test_video_ref_rejects_malformed_values() {
        assert!("no-comma".parse::<VideoRef>().is_err());
        assert!(",key.mp4".parse::<VideoRef>().is_err());
        assert!("bucket,".parse::<VideoRef>().is_err());
        assert!(VideoRef::new("a,b", "key").is_err());
    }

    #[test]
    fn test_response_carries_signed_url_not_reference() {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Boots".to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_ref: Some(VideoRef::new("bucket", "landscape/x.mp4").unwrap()),
        };
        let response = VideoResponse::new(video, Some("https://signed".to_string()));
        assert_eq!(response.video_url.as_deref(), Some("https://signed"));
    }
}
