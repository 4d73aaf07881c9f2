//! Video repository: lookup and update for the videos table.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tubely_core::models::{Video, VideoRef};
use tubely_core::AppError;
use uuid::Uuid;

/// Metadata store operations used by the ingest pipeline.
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a video record by id.
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Point an existing record at its normalized video. Only `video_url` and
    /// `updated_at` are written; returns the record as stored afterwards.
    async fn set_video_ref(
        &self,
        id: Uuid,
        video_ref: &VideoRef,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError>;

    /// Set the thumbnail URL of an existing record. Only `thumbnail_url` and
    /// `updated_at` are written; returns the record as stored afterwards.
    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        thumbnail_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError>;
}

/// Row type for videos table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct VideoRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub user_id: Uuid,
}

impl VideoRow {
    pub fn try_into_video(self) -> Result<Video, AppError> {
        let video_ref = self
            .video_url
            .as_deref()
            .map(str::parse::<VideoRef>)
            .transpose()?;
        Ok(Video {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            thumbnail_url: self.thumbnail_url,
            video_ref,
        })
    }
}

/// Postgres-backed repository for the videos table.
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            SELECT id, created_at, updated_at, title, description,
                   thumbnail_url, video_url, user_id
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(VideoRow::try_into_video).transpose()
    }

    #[tracing::instrument(skip(self, video_ref), fields(db.table = "videos", db.record_id = %id, key = %video_ref.key))]
    async fn set_video_ref(
        &self,
        id: Uuid,
        video_ref: &VideoRef,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError> {
        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            UPDATE videos
            SET video_url = $2,
                updated_at = $3
            WHERE id = $1
            RETURNING id, created_at, updated_at, title, description,
                      thumbnail_url, video_url, user_id
            "#,
        )
        .bind(id)
        .bind(video_ref.encode())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?
            .try_into_video()
    }

    #[tracing::instrument(skip(self, thumbnail_url), fields(db.table = "videos", db.record_id = %id))]
    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        thumbnail_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Video, AppError> {
        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            UPDATE videos
            SET thumbnail_url = $2,
                updated_at = $3
            WHERE id = $1
            RETURNING id, created_at, updated_at, title, description,
                      thumbnail_url, video_url, user_id
            "#,
        )
        .bind(id)
        .bind(thumbnail_url)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))?
            .try_into_video()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(video_url: Option<&str>) -> VideoRow {
        let now = Utc::now();
        VideoRow {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            title: "Boots".to_string(),
            description: "A pair of boots".to_string(),
            thumbnail_url: None,
            video_url: video_url.map(str::to_string),
            user_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_row_without_video_url_has_no_reference() {
        let video = row(None).try_into_video().unwrap();
        assert!(video.video_ref.is_none());
    }

    #[test]
    fn test_row_video_url_is_parsed_into_reference() {
        let video = row(Some("tubely-videos,portrait/abc.mp4"))
            .try_into_video()
            .unwrap();
        let video_ref = video.video_ref.unwrap();
        assert_eq!(video_ref.container, "tubely-videos");
        assert_eq!(video_ref.key, "portrait/abc.mp4");
    }

    #[test]
    fn test_row_with_malformed_video_url_is_rejected() {
        assert!(row(Some("not-a-reference")).try_into_video().is_err());
    }
}
