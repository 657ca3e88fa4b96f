//! Configuration module
//!
//! Configuration is read once from the environment in `main` and passed down
//! explicitly; nothing here is global.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_VIDEO_SIZE_MB, DEFAULT_MEDIA_TOOL_TIMEOUT_SECS, DEFAULT_SIGNED_URL_TTL_SECS,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_ISSUER: &str = "clipvault-access";
const JWT_EXPIRY_HOURS: i64 = 24;

/// `None` when the byte count does not fit in a `u64`.
fn megabytes_to_bytes(megabytes: u64) -> Option<u64> {
    megabytes.checked_mul(1024 * 1024)
}

/// Server, auth and database settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiry_hours: i64,
    /// When unset, outside production, records are kept in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    /// HMAC key for local-backend signed URLs.
    pub signing_secret: Option<String>,
}

/// What gets written to a video's `video_url` after an upload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocationMode {
    /// Store the object key and sign it on every read.
    Key,
    /// Store the backend's plain object URL and return it as-is.
    Url,
}

impl FromStr for LocationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "key" => Ok(LocationMode::Key),
            "url" => Ok(LocationMode::Url),
            _ => Err(anyhow::anyhow!("Invalid video location mode: {}", s)),
        }
    }
}

/// Video ingestion settings
#[derive(Clone, Debug)]
pub struct VideoConfig {
    /// Directory holding scratch files while an upload is processed.
    pub scratch_dir: PathBuf,
    pub max_video_size_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub media_tool_timeout: Duration,
    pub signed_url_ttl: Duration,
    pub location_mode: LocationMode,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub video: VideoConfig,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| JWT_ISSUER.to_string()),
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
        };

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            signing_secret: env::var("SIGNING_SECRET").ok().filter(|s| !s.is_empty()),
        };

        let video = VideoConfig {
            scratch_dir: PathBuf::from(
                env::var("SCRATCH_DIR").unwrap_or_else(|_| "./assets".to_string()),
            ),
            max_video_size_bytes: megabytes_to_bytes(
                env::var("MAX_VIDEO_SIZE_MB")
                    .unwrap_or_else(|_| DEFAULT_MAX_VIDEO_SIZE_MB.to_string())
                    .parse::<u64>()
                    .unwrap_or(DEFAULT_MAX_VIDEO_SIZE_MB),
            )
            .ok_or_else(|| anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large"))?,
            allowed_content_types: env::var("VIDEO_ALLOWED_CONTENT_TYPES")
                .unwrap_or_else(|_| "video/mp4".to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            media_tool_timeout: Duration::from_secs(
                env::var("MEDIA_TOOL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_MEDIA_TOOL_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_MEDIA_TOOL_TIMEOUT_SECS),
            ),
            signed_url_ttl: Duration::from_secs(
                env::var("SIGNED_URL_TTL_SECS")
                    .unwrap_or_else(|_| DEFAULT_SIGNED_URL_TTL_SECS.to_string())
                    .parse()
                    .unwrap_or(DEFAULT_SIGNED_URL_TTL_SECS),
            ),
            location_mode: match env::var("VIDEO_LOCATION_MODE") {
                Ok(value) => value.parse()?,
                Err(_) => LocationMode::Key,
            },
        };

        let config = Config {
            base,
            storage,
            video,
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

        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        match self.base.database_url.as_deref() {
            Some(url) if !url.starts_with("postgres://") && !url.starts_with("postgresql://") => {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
            None if self.is_production() => {
                return Err(anyhow::anyhow!("DATABASE_URL must be set in production"));
            }
            _ => {}
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                if self.storage.signing_secret.as_deref().map_or(0, str::len) < 32 {
                    return Err(anyhow::anyhow!(
                        "SIGNING_SECRET must be at least 32 characters long for local storage"
                    ));
                }
            }
        }

        if self.video.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB must be greater than zero"));
        }
        if usize::try_from(self.video.max_video_size_bytes).is_err() {
            return Err(anyhow::anyhow!("MAX_VIDEO_SIZE_MB is too large"));
        }
        if self.video.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_CONTENT_TYPES must list at least one type"
            ));
        }
        if self.video.signed_url_ttl.is_zero() {
            return Err(anyhow::anyhow!("SIGNED_URL_TTL_SECS must be greater than zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> Config {
        Config {
            base: BaseConfig {
                server_port: 4000,
                environment: "development".to_string(),
                cors_origins: vec!["*".to_string()],
                jwt_secret: "a".repeat(32),
                jwt_issuer: JWT_ISSUER.to_string(),
                jwt_expiry_hours: 24,
                database_url: None,
                db_max_connections: 5,
                db_timeout_seconds: 5,
            },
            storage: StorageConfig {
                backend: StorageBackend::Local,
                s3_bucket: None,
                s3_region: None,
                s3_endpoint: None,
                local_storage_path: Some("/tmp/clipvault".to_string()),
                local_storage_base_url: Some("http://localhost:4000/assets".to_string()),
                signing_secret: Some("s".repeat(32)),
            },
            video: VideoConfig {
                scratch_dir: PathBuf::from("/tmp/clipvault-scratch"),
                max_video_size_bytes: 1 << 30,
                allowed_content_types: vec!["video/mp4".to_string()],
                ffmpeg_path: "ffmpeg".to_string(),
                ffprobe_path: "ffprobe".to_string(),
                media_tool_timeout: Duration::from_secs(600),
                signed_url_ttl: Duration::from_secs(60),
                location_mode: LocationMode::Key,
            },
        }
    }

    #[test]
    fn test_local_config_is_valid() {
        assert!(local_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = local_config();
        config.base.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_database_and_explicit_cors() {
        let mut config = local_config();
        config.base.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.base.cors_origins = vec!["https://app.example.com".to_string()];
        assert!(config.validate().is_err());

        config.base.database_url = Some("postgres://localhost/clipvault".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_s3_backend_needs_bucket_and_region() {
        let mut config = local_config();
        config.storage.backend = StorageBackend::S3;
        assert!(config.validate().is_err());

        config.storage.s3_bucket = Some("videos".to_string());
        config.storage.s3_region = Some("us-east-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_local_backend_needs_signing_secret() {
        let mut config = local_config();
        config.storage.signing_secret = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_megabytes_to_bytes_rejects_overflow() {
        assert_eq!(megabytes_to_bytes(1024), Some(1 << 30));
        assert!(megabytes_to_bytes(u64::MAX / (1024 * 1024)).is_some());
        assert_eq!(megabytes_to_bytes(u64::MAX / (1024 * 1024) + 1), None);
        assert_eq!(megabytes_to_bytes(u64::MAX), None);
    }

    #[test]
    fn test_location_mode_parse() {
        assert_eq!("KEY".parse::<LocationMode>().unwrap(), LocationMode::Key);
        assert_eq!("url".parse::<LocationMode>().unwrap(), LocationMode::Url);
        assert!("path".parse::<LocationMode>().is_err());
    }
}
