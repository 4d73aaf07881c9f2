//! Turns stored video references into time-limited signed URLs.
//!
//! Signing happens on every read and is never persisted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tubely_core::models::{Video, VideoResponse};
use tubely_core::AppError;
use tubely_storage::Storage;

#[derive(Clone)]
pub struct ReferenceResolver {
    stores: HashMap<String, Arc<dyn Storage>>,
    ttl: Duration,
}

impl ReferenceResolver {
    pub fn new(ttl: Duration) -> Self {
        Self {
            stores: HashMap::new(),
            ttl,
        }
    }

    /// Register a store under its container name.
    pub fn with_store(mut self, store: Arc<dyn Storage>) -> Self {
        self.stores.insert(store.container().to_string(), store);
        self
    }

    /// Client view of `video` with its reference replaced by a signed URL.
    pub async fn sign(&self, video: Video) -> Result<VideoResponse, AppError> {
        let signed_url = match &video.video_ref {
            None => None,
            Some(video_ref) => {
                let store = self.stores.get(&video_ref.container).ok_or_else(|| {
                    AppError::StorageFailure(format!(
                        "Unknown storage container: {}",
                        video_ref.container
                    ))
                })?;
                Some(store.presigned_get_url(&video_ref.key, self.ttl).await?)
            }
        };

        Ok(VideoResponse::new(video, signed_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;
    use tubely_core::models::VideoRef;
    use tubely_storage::LocalStorage;
    use uuid::Uuid;

    async fn resolver(dir: &TempDir) -> ReferenceResolver {
        let store = LocalStorage::new(dir.path(), "http://localhost:8091/media".to_string())
            .await
            .unwrap()
            .with_container("tubely-test")
            .with_signing_key("s".repeat(32));
        ReferenceResolver::new(Duration::from_secs(3600)).with_store(Arc::new(store))
    }

    fn video(video_ref: Option<VideoRef>) -> Video {
        let now = Utc::now();
        Video {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Boots".to_string(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_ref,
        }
    }

    #[tokio::test]
    async fn test_reference_signed_with_ttl() {
        let dir = TempDir::new().unwrap();
        let before = Utc::now().timestamp() as u64;
        let video_ref = VideoRef::new("tubely-test", "landscape/abc.mp4").unwrap();

        let response = resolver(&dir).await.sign(video(Some(video_ref))).await.unwrap();

        let url = response.video_url.unwrap();
        assert!(url.starts_with("http://localhost:8091/media/landscape/abc.mp4?expires="));
        let expires: u64 = url
            .split("expires=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(expires >= before + 3600 && expires <= before + 3602);
    }

    #[tokio::test]
    async fn test_missing_reference_is_left_empty() {
        let dir = TempDir::new().unwrap();
        let response = resolver(&dir).await.sign(video(None)).await.unwrap();
        assert!(response.video_url.is_none());
    }

    #[tokio::test]
    async fn test_unknown_container_is_storage_failure() {
        let dir = TempDir::new().unwrap();
        let video_ref = VideoRef::new("somewhere-else", "landscape/abc.mp4").unwrap();
        let err = resolver(&dir)
            .await
            .sign(video(Some(video_ref)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageFailure(_)));
    }
}
