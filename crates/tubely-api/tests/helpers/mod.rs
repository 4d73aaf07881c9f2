//! Test helpers: build AppState and router for integration tests.
//!
//! The router runs against an in-memory video repository, local storage in
//! temp directories and shell scripts standing in for ffprobe/ffmpeg, so these
//! tests need a unix shell but no database or object store.
#![allow(dead_code)]

pub mod fixtures;

use axum_test::TestServer;
use chrono::Utc;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::models::Video;
use tubely_core::{BaseConfig, Config, IngestConfig, LogFormat, StorageBackend};
use tubely_db::InMemoryVideoRepository;
use tubely_storage::{LocalStorage, StorageSet};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_CONTAINER: &str = "tubely-test";
pub const MEDIA_BASE_URL: &str = "http://localhost:8091/media";
pub const ASSETS_BASE_URL: &str = "http://localhost:8091/assets";

/// ffmpeg stand-in: copies the input (third argument, after `-y -i`) to the
/// output (last argument).
pub const COPYING_FFMPEG: &str = r#"for last; do :; done; cp "$3" "$last""#;

/// ffprobe stand-in body reporting one video stream of the given size.
pub fn probe_reporting(width: u32, height: u32) -> String {
    format!(
        r#"echo '{{"streams":[{{"index":0,"codec_type":"video","width":{},"height":{}}},{{"index":1,"codec_type":"audio"}}]}}'"#,
        width, height
    )
}

/// Test application: server, repository and owned temp directories.
pub struct TestApp {
    pub server: TestServer,
    pub repo: InMemoryVideoRepository,
    pub state: Arc<AppState>,
    pub staging: TempDir,
    pub storage_root: TempDir,
    _tools: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a video owned by `owner` and return its ID.
    pub fn seed_video(&self, owner: Uuid) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.repo.insert(Video {
            id,
            user_id: owner,
            title: "Boots on the ground".to_string(),
            description: "Unboxing".to_string(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_ref: None,
        });
        id
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.state.jwt.issue(user_id).expect("Failed to issue token")
    }

    pub fn staging_entries(&self) -> usize {
        count_files(self.staging.path())
    }

    pub fn media_dir(&self) -> std::path::PathBuf {
        self.storage_root.path().join("media")
    }

    pub fn assets_dir(&self) -> std::path::PathBuf {
        self.storage_root.path().join("assets")
    }

    pub fn stored_media(&self) -> usize {
        count_files(&self.media_dir())
    }

    pub fn stored_assets(&self) -> usize {
        count_files(&self.assets_dir())
    }
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

fn write_script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
    path.to_string_lossy().into_owned()
}

pub fn create_test_config(
    staging_dir: &Path,
    storage_root: &Path,
    ffprobe_path: String,
    ffmpeg_path: String,
) -> Config {
    Config(Box::new(IngestConfig {
        base: BaseConfig {
            server_port: 8091,
            cors_origins: vec!["*".to_string()],
            http_concurrency_limit: 64,
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
            environment: "test".to_string(),
            log_format: LogFormat::Pretty,
        },
        database_url: "postgresql://localhost/tubely_test".to_string(),
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: Some(storage_root.join("media").to_string_lossy().into_owned()),
        local_storage_base_url: Some(MEDIA_BASE_URL.to_string()),
        url_signing_secret: TEST_JWT_SECRET.to_string(),
        assets_root: storage_root.join("assets"),
        assets_base_url: ASSETS_BASE_URL.to_string(),
        staging_dir: staging_dir.to_path_buf(),
        ffprobe_path,
        ffmpeg_path,
        request_timeout_secs: 30,
        signed_url_ttl_minutes: 60,
    }))
}

/// Setup a test app whose ffprobe reports a 1280x720 stream.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_tools(&probe_reporting(1280, 720), COPYING_FFMPEG).await
}

/// Setup a test app with custom ffprobe/ffmpeg script bodies.
pub async fn setup_test_app_with_tools(ffprobe_body: &str, ffmpeg_body: &str) -> TestApp {
    let tools = tempfile::tempdir().expect("Failed to create tools directory");
    let staging = tempfile::tempdir().expect("Failed to create staging directory");
    let storage_root = tempfile::tempdir().expect("Failed to create storage directory");

    let ffprobe = write_script(tools.path(), "ffprobe", ffprobe_body);
    let ffmpeg = write_script(tools.path(), "ffmpeg", ffmpeg_body);
    let config = create_test_config(staging.path(), storage_root.path(), ffprobe, ffmpeg);

    let media = Arc::new(
        LocalStorage::new(storage_root.path().join("media"), MEDIA_BASE_URL.to_string())
            .await
            .expect("Failed to create media storage")
            .with_container(TEST_CONTAINER)
            .with_signing_key(config.url_signing_secret()),
    );
    let assets = Arc::new(
        LocalStorage::new(config.assets_root().clone(), ASSETS_BASE_URL.to_string())
            .await
            .expect("Failed to create assets storage"),
    );
    let storage = StorageSet {
        media: media.clone(),
        local_media: Some(media),
        assets,
    };

    let repo = InMemoryVideoRepository::new();
    let state = Arc::new(AppState::new(config.clone(), Arc::new(repo.clone()), storage));
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build router");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        repo,
        state,
        staging,
        storage_root,
        _tools: tools,
    }
}
