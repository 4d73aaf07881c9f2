//! Ingest pipeline
//!
//! Uploads are first staged with [`IngestPipeline::stage`]; the staged file is
//! then handed to one of the ingest operations:
//!
//! Video: probe → classify → faststart remux → key → store.
//! Thumbnail: key → store verbatim.
//!
//! Every staged file is dropped (and deleted) before an ingest returns.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tokio::time::Instant;
use tubely_core::models::{Orientation, VideoRef};
use tubely_core::{AppError, Config};
use tubely_storage::{ObjectKey, Storage};

use crate::normalize::StreamNormalizer;
use crate::policy::{MediaType, UploadPolicy};
use crate::probe::{GeometryProber, StreamGeometry};
use crate::staging::{StagedFile, Stager};

/// Result of a successful video ingest
#[derive(Debug, Clone)]
pub struct IngestedVideo {
    pub video_ref: VideoRef,
    pub geometry: StreamGeometry,
    pub orientation: Orientation,
    pub size_bytes: u64,
}

/// Result of a successful thumbnail ingest
#[derive(Debug, Clone)]
pub struct IngestedThumbnail {
    pub key: ObjectKey,
    /// Public URL the thumbnail is served from
    pub url: String,
}

pub struct IngestPipeline {
    stager: Stager,
    prober: GeometryProber,
    normalizer: StreamNormalizer,
    media: Arc<dyn Storage>,
    assets: Arc<dyn Storage>,
}

impl IngestPipeline {
    pub fn new(
        stager: Stager,
        prober: GeometryProber,
        normalizer: StreamNormalizer,
        media: Arc<dyn Storage>,
        assets: Arc<dyn Storage>,
    ) -> Self {
        Self {
            stager,
            prober,
            normalizer,
            media,
            assets,
        }
    }

    pub fn from_config(config: &Config, media: Arc<dyn Storage>, assets: Arc<dyn Storage>) -> Self {
        Self::new(
            Stager::new(config.staging_dir().clone()),
            GeometryProber::new(config.ffprobe_path()),
            StreamNormalizer::new(config.ffmpeg_path()),
            media,
            assets,
        )
    }

    /// Storage holding normalized videos
    pub fn media_storage(&self) -> &Arc<dyn Storage> {
        &self.media
    }

    /// Stage an upload stream, enforcing the policy's size ceiling.
    #[tracing::instrument(skip(self, reader, policy), fields(field = policy.field_name, mime = media_type.mime()))]
    pub async fn stage<R>(
        &self,
        reader: R,
        policy: &UploadPolicy,
        media_type: MediaType,
    ) -> Result<StagedFile, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let suffix = format!(".{}", media_type.extension());
        Ok(self.stager.stage(reader, policy.max_bytes, &suffix).await?)
    }

    #[tracing::instrument(skip(self, raw, deadline), fields(mime = media_type.mime()))]
    pub async fn ingest_video(
        &self,
        raw: StagedFile,
        media_type: MediaType,
        deadline: Instant,
    ) -> Result<IngestedVideo, AppError> {
        let geometry = self.prober.probe(raw.path(), deadline).await?;
        let orientation = geometry.orientation();

        let normalized = self.normalizer.faststart(&raw, deadline).await?;
        drop(raw);

        let key = ObjectKey::for_video(orientation, media_type.extension());
        let size_bytes = self
            .media
            .put_file(key.as_str(), normalized.path(), media_type.mime(), deadline)
            .await?;

        let video_ref = VideoRef::new(self.media.container(), key.as_str())?;
        tracing::info!(
            container = %video_ref.container,
            key = %video_ref.key,
            orientation = %orientation,
            size_bytes,
            "Video ingested"
        );

        Ok(IngestedVideo {
            video_ref,
            geometry,
            orientation,
            size_bytes,
        })
    }

    #[tracing::instrument(skip(self, staged, deadline), fields(mime = media_type.mime()))]
    pub async fn ingest_thumbnail(
        &self,
        staged: StagedFile,
        media_type: MediaType,
        deadline: Instant,
    ) -> Result<IngestedThumbnail, AppError> {
        let key = ObjectKey::for_thumbnail(media_type.extension());
        self.assets
            .put_file(key.as_str(), staged.path(), media_type.mime(), deadline)
            .await?;

        let url = self.assets.public_url(key.as_str());
        tracing::info!(key = %key, size_bytes = staged.size(), "Thumbnail ingested");

        Ok(IngestedThumbnail { key, url })
    }
}
