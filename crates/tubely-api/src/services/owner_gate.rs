use std::sync::Arc;

use tubely_core::models::Video;
use tubely_core::AppError;
use tubely_db::VideoRepository;
use uuid::Uuid;

/// Ownership check run before any upload byte is staged.
#[derive(Clone)]
pub struct OwnerGate {
    videos: Arc<dyn VideoRepository>,
}

impl OwnerGate {
    pub fn new(videos: Arc<dyn VideoRepository>) -> Self {
        Self { videos }
    }

    /// Load `video_id` and check that `caller` owns it.
    #[tracing::instrument(skip(self))]
    pub async fn authorize(&self, caller: Uuid, video_id: Uuid) -> Result<Video, AppError> {
        let video = self
            .videos
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if !video.is_owned_by(caller) {
            tracing::warn!(
                video_id = %video_id,
                caller = %caller,
                owner = %video.user_id,
                "Caller does not own video"
            );
            return Err(AppError::Unauthorized(
                "Only the owner can change this video".to_string(),
            ));
        }

        Ok(video)
    }
}
