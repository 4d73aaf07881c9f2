//! Configuration module
//!
//! This module provides configuration structures for the ingest API,
//! including database, storage, authentication, and media tool settings.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 20;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const REQUEST_TIMEOUT_SECS: u64 = 300;
const SIGNED_URL_TTL_MINUTES: u64 = 60;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 24 * 60 * 60;
// Longest expiry S3 accepts for a presigned URL
const MAX_SIGNED_URL_TTL_MINUTES: u64 = 7 * 24 * 60;

/// Output format of the tracing subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Base configuration shared by every entry point
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    /// Server-wide cap on in-flight requests
    pub http_concurrency_limit: usize,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
    pub log_format: LogFormat,
}

/// Ingest service configuration
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// Secret used to sign local media URLs
    pub url_signing_secret: String,
    // Thumbnails
    pub assets_root: PathBuf,
    pub assets_base_url: String,
    // Media processing configuration
    pub staging_dir: PathBuf,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub request_timeout_secs: u64,
    pub signed_url_ttl_minutes: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IngestConfig>);

impl Config {
    fn as_ingest(&self) -> &IngestConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_ingest().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = IngestConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_ingest().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_ingest().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_ingest().base.cors_origins
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_ingest().base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_ingest().base.jwt_expiry_hours
    }

    pub fn environment(&self) -> &str {
        &self.as_ingest().base.environment
    }

    pub fn log_format(&self) -> LogFormat {
        self.as_ingest().base.log_format
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_ingest().base.http_concurrency_limit
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_ingest().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_ingest().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.as_ingest().database_url
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_ingest().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_ingest().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_ingest().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_ingest().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_ingest().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_ingest().local_storage_base_url.as_deref()
    }

    pub fn url_signing_secret(&self) -> &str {
        &self.as_ingest().url_signing_secret
    }

    pub fn assets_root(&self) -> &PathBuf {
        &self.as_ingest().assets_root
    }

    pub fn assets_base_url(&self) -> &str {
        &self.as_ingest().assets_base_url
    }

    pub fn staging_dir(&self) -> &PathBuf {
        &self.as_ingest().staging_dir
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_ingest().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_ingest().ffmpeg_path
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.as_ingest().request_timeout_secs)
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.as_ingest().signed_url_ttl_minutes.saturating_mul(60))
    }
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?;

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: jwt_secret.clone(),
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            environment,
            log_format,
        };

        let s3_bucket = env::var("S3_BUCKET").ok().filter(|s| !s.is_empty());

        // Explicit backend wins; otherwise a configured bucket selects S3.
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) if s3_bucket.is_some() => StorageBackend::S3,
            Err(_) => StorageBackend::Local,
        };

        let port = base.server_port;
        let config = IngestConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket,
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            url_signing_secret: env::var("URL_SIGNING_SECRET").unwrap_or(jwt_secret),
            assets_root: env::var("ASSETS_ROOT")
                .unwrap_or_else(|_| "./assets".to_string())
                .into(),
            assets_base_url: env::var("ASSETS_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/assets", port))
                .trim_end_matches('/')
                .to_string(),
            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            signed_url_ttl_minutes: env::var("SIGNED_URL_TTL_MINUTES")
                .unwrap_or_else(|_| SIGNED_URL_TTL_MINUTES.to_string())
                .parse()
                .unwrap_or(SIGNED_URL_TTL_MINUTES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !(self.database_url.starts_with("postgresql://")
            || self.database_url.starts_with("postgres://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.storage_backend == StorageBackend::S3 && self.s3_bucket.is_none() {
            return Err(anyhow::anyhow!("STORAGE_BACKEND=s3 requires S3_BUCKET"));
        }

        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(anyhow::anyhow!(
                "REQUEST_TIMEOUT_SECS must be between 1 and {}",
                MAX_REQUEST_TIMEOUT_SECS
            ));
        }

        if !(1..=MAX_SIGNED_URL_TTL_MINUTES).contains(&self.signed_url_ttl_minutes) {
            return Err(anyhow::anyhow!(
                "SIGNED_URL_TTL_MINUTES must be between 1 and {}",
                MAX_SIGNED_URL_TTL_MINUTES
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IngestConfig {
        IngestConfig {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
                db_max_connections: MAX_CONNECTIONS,
                db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
                jwt_secret: "a".repeat(32),
                jwt_expiry_hours: JWT_EXPIRY_HOURS,
                environment: "development".to_string(),
                log_format: LogFormat::Pretty,
            },
            database_url: "postgres://localhost/tubely".to_string(),
            storage_backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some("./media".to_string()),
            local_storage_base_url: None,
            url_signing_secret: "b".repeat(32),
            assets_root: PathBuf::from("./assets"),
            assets_base_url: "http://localhost:8091/assets".to_string(),
            staging_dir: env::temp_dir(),
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            signed_url_ttl_minutes: SIGNED_URL_TTL_MINUTES,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = sample();
        config.base.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let mut config = sample();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());
        config.s3_bucket = Some("tubely-videos".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_durations_rejected() {
        let mut config = sample();
        config.request_timeout_secs = u64::MAX;
        assert!(config.validate().is_err());
        config.request_timeout_secs = MAX_REQUEST_TIMEOUT_SECS;
        assert!(config.validate().is_ok());

        config.signed_url_ttl_minutes = u64::MAX / 2;
        assert!(config.validate().is_err());
        config.signed_url_ttl_minutes = MAX_SIGNED_URL_TTL_MINUTES + 1;
        assert!(config.validate().is_err());
        config.signed_url_ttl_minutes = MAX_SIGNED_URL_TTL_MINUTES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_signed_url_ttl_defaults_to_one_hour() {
        let config = Config(Box::new(sample()));
        assert_eq!(config.signed_url_ttl(), Duration::from_secs(3600));
        assert_eq!(config.request_timeout(), Duration::from_secs(300));
    }
}
