//! In-memory repository for tests
//!
//! Lets API tests run the full pipeline without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tubely_core::models::{Video, VideoRef};
use tubely_core::AppError;
use uuid::Uuid;

use super::video::VideoRepository;

#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
    updates: Arc<Mutex<usize>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn videos(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Video>>, AppError> {
        self.videos
            .lock()
            .map_err(|_| AppError::Internal("video store lock poisoned".to_string()))
    }

    pub fn insert(&self, video: Video) {
        if let Ok(mut videos) = self.videos() {
            videos.insert(video.id, video);
        }
    }

    /// Snapshot of a record, bypassing the trait.
    pub fn snapshot(&self, id: Uuid) -> Option<Video> {
        self.videos().ok().and_then(|videos| videos.get(&id).cloned())
    }

    /// Change the title outside the repository trait, the way another
    /// service sharing the table would.
    pub fn rename(&self, id: Uuid, title: &str) {
        if let Ok(mut videos) = self.videos() {
            if let Some(video) = videos.get_mut(&id) {
                video.title = title.to_string();
            }
        }
    }

    /// Number of successful write-backs.
    pub fn update_count(&self) -> usize {
        self.updates.lock().map(|count| *count).unwrap_or(0)
    }

    fn modify(&self, id: Uuid, apply: impl FnOnce(&mut Video)) -> Result<Video, AppError> {
        let mut videos = self.videos()?;
        let video = videos
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?;
        apply(video);
        let updated = video.clone();
        if let Ok(mut count) = self.updates.lock() {
            *count += 1;
        }
        Ok(updated)
    }
}

#[async_trait::async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos()?.get(&id).cloned())
    }

    async fn set_video_ref(
        &self,
        id: Uuid,
        video_ref: &VideoRef,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError> {
        self.modify(id, |video| {
            video.video_ref = Some(video_ref.clone());
            video.updated_at = updated_at;
        })
    }

    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        thumbnail_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError> {
        self.modify(id, |video| {
            video.thumbnail_url = Some(thumbnail_url.to_string());
            video.updated_at = updated_at;
        })
    }
}
