//! Application state shared by all handlers.

use std::sync::Arc;

use tubely_core::Config;
use tubely_db::VideoRepository;
use tubely_processing::IngestPipeline;
use tubely_storage::{LocalStorage, StorageSet};

use crate::auth::JwtService;
use crate::services::{OwnerGate, ReferenceResolver, VideoLocks};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub gate: OwnerGate,
    pub locks: VideoLocks,
    pub pipeline: Arc<IngestPipeline>,
    pub resolver: ReferenceResolver,
    pub jwt: Arc<JwtService>,
    /// Thumbnail directory served under `/assets`.
    pub assets: Arc<LocalStorage>,
    /// Set when videos live on the local filesystem and `/media` serves them.
    pub local_media: Option<Arc<LocalStorage>>,
}

impl AppState {
    pub fn new(config: Config, videos: Arc<dyn VideoRepository>, storage: StorageSet) -> Self {
        let pipeline = IngestPipeline::from_config(&config, storage.media.clone(), storage.assets.clone());
        let resolver = ReferenceResolver::new(config.signed_url_ttl()).with_store(storage.media);
        let jwt = JwtService::new(config.jwt_secret(), config.jwt_expiry_hours());

        Self {
            gate: OwnerGate::new(videos.clone()),
            locks: VideoLocks::new(),
            pipeline: Arc::new(pipeline),
            resolver,
            jwt: Arc::new(jwt),
            assets: storage.assets,
            local_media: storage.local_media,
            videos,
            config,
        }
    }
}
