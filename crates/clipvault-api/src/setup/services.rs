//! Service initialization

use crate::auth::JwtService;
use crate::state::AppState;
use anyhow::Result;
use clipvault_core::Config;
use clipvault_db::VideoRepository;
use clipvault_processing::{CommandTool, IngestConfig, MediaTool, VideoIngestPipeline};
use clipvault_storage::{LocalStorage, Storage};
use sqlx::PgPool;
use std::sync::Arc;

/// Wire the ingest pipeline to the real ffmpeg and ffprobe binaries.
pub fn initialize_services(
    config: &Config,
    pool: Option<PgPool>,
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    local_assets: Option<Arc<LocalStorage>>,
) -> Result<Arc<AppState>> {
    let timeout = config.video.media_tool_timeout;
    let ffmpeg: Arc<dyn MediaTool> =
        Arc::new(CommandTool::new(config.video.ffmpeg_path.clone(), timeout));
    let ffprobe: Arc<dyn MediaTool> =
        Arc::new(CommandTool::new(config.video.ffprobe_path.clone(), timeout));

    tracing::info!(
        ffmpeg = %config.video.ffmpeg_path,
        ffprobe = %config.video.ffprobe_path,
        timeout_secs = timeout.as_secs(),
        "Media tools configured"
    );

    Ok(build_state(
        config,
        pool,
        videos,
        storage,
        local_assets,
        ffmpeg,
        ffprobe,
    ))
}

/// Assemble [`AppState`] from already-built parts.
///
/// Tests call this directly with scripted media tools.
pub fn build_state(
    config: &Config,
    pool: Option<PgPool>,
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    local_assets: Option<Arc<LocalStorage>>,
    ffmpeg: Arc<dyn MediaTool>,
    ffprobe: Arc<dyn MediaTool>,
) -> Arc<AppState> {
    let pipeline = VideoIngestPipeline::from_tools(
        ffmpeg,
        ffprobe,
        storage.clone(),
        videos.clone(),
        IngestConfig::from_video_config(&config.video),
    );

    let jwt = JwtService::new(
        &config.base.jwt_secret,
        config.base.jwt_issuer.clone(),
        config.base.jwt_expiry_hours,
    );

    Arc::new(AppState {
        config: config.clone(),
        pool,
        videos,
        storage,
        local_assets,
        pipeline,
        jwt,
    })
}
