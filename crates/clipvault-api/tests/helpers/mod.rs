//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p clipvault-api`. No database or
//! ffmpeg is needed: records live in memory, storage is a temp directory and
//! the media tools are scripted.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;

use axum_test::TestServer;
use clipvault_api::constants;
use clipvault_api::setup::{routes, services};
use clipvault_api::state::AppState;
use clipvault_core::{BaseConfig, Config, LocationMode, StorageBackend, StorageConfig, VideoConfig};
use clipvault_db::{InMemoryVideoRepository, VideoRepository};
use clipvault_processing::testing::FakeMediaTool;
use clipvault_processing::MediaTool;
use clipvault_storage::{LocalStorage, Storage};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Base URL local storage signs against; requests strip it before hitting the router.
pub const TEST_ASSETS_BASE_URL: &str = "http://localhost:4000/assets";

/// Upload ceiling used by the test config.
pub const TEST_MAX_VIDEO_SIZE_BYTES: u64 = 64 * 1024;

const TEST_SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, state and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub ffmpeg: Arc<FakeMediaTool>,
    pub ffprobe: Arc<FakeMediaTool>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_root(&self) -> &Path {
        self.state
            .config
            .storage
            .local_storage_path
            .as_deref()
            .map(Path::new)
            .expect("local storage path set")
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.state.config.video.scratch_dir
    }
}

pub fn create_test_config(temp_dir: &Path) -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            jwt_secret: TEST_SECRET.to_string(),
            jwt_issuer: "clipvault-test".to_string(),
            jwt_expiry_hours: 1,
            database_url: None,
            db_max_connections: 1,
            db_timeout_seconds: 1,
        },
        storage: StorageConfig {
            backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some(temp_dir.join("storage").display().to_string()),
            local_storage_base_url: Some(TEST_ASSETS_BASE_URL.to_string()),
            signing_secret: Some(TEST_SECRET.to_string()),
        },
        video: VideoConfig {
            scratch_dir: temp_dir.join("scratch"),
            max_video_size_bytes: TEST_MAX_VIDEO_SIZE_BYTES,
            allowed_content_types: vec!["video/mp4".to_string()],
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            media_tool_timeout: Duration::from_secs(5),
            signed_url_ttl: Duration::from_secs(60),
            location_mode: LocationMode::Key,
        },
    }
}

/// Setup a test app whose probe reports a 1920x1080 stream.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_probe(FakeMediaTool::probe_reporting(1920, 1080)).await
}

pub async fn setup_test_app_with_probe(ffprobe: FakeMediaTool) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(temp_dir.path());

    let local = Arc::new(
        clipvault_storage::create_local_storage(&config.storage)
            .await
            .expect("Failed to create local storage"),
    );
    let storage: Arc<dyn Storage> = local.clone();
    let local_assets: Option<Arc<LocalStorage>> = Some(local);
    let videos: Arc<dyn VideoRepository> = Arc::new(InMemoryVideoRepository::new());

    let ffmpeg = Arc::new(FakeMediaTool::faststart_copy());
    let ffprobe = Arc::new(ffprobe);
    let ffmpeg_tool: Arc<dyn MediaTool> = ffmpeg.clone();
    let ffprobe_tool: Arc<dyn MediaTool> = ffprobe.clone();

    let state = services::build_state(
        &config,
        None,
        videos,
        storage,
        local_assets,
        ffmpeg_tool,
        ffprobe_tool,
    );
    let router = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(router.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        ffmpeg,
        ffprobe,
        _temp_dir: temp_dir,
    }
}

/// Split a signed local-storage URL into the router path and its query pairs.
pub fn signed_url_parts(url: &str) -> (String, Vec<(String, String)>) {
    let origin = TEST_ASSETS_BASE_URL
        .strip_suffix(constants::ASSETS_PREFIX)
        .expect("base URL ends with the assets prefix");
    let relative = url.strip_prefix(origin).expect("URL under the test origin");
    let (path, query) = relative.split_once('?').expect("signed URL has a query");
    let pairs = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (path.to_string(), pairs)
}
