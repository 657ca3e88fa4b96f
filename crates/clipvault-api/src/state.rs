//! Application state shared by every handler.

use crate::auth::JwtService;
use clipvault_core::Config;
use clipvault_db::VideoRepository;
use clipvault_processing::VideoIngestPipeline;
use clipvault_storage::{LocalStorage, Storage};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Present only when records live in PostgreSQL.
    pub pool: Option<PgPool>,
    pub videos: Arc<dyn VideoRepository>,
    pub storage: Arc<dyn Storage>,
    /// Set with the local backend; verifies `/assets` signatures.
    pub local_assets: Option<Arc<LocalStorage>>,
    pub pipeline: VideoIngestPipeline,
    pub jwt: JwtService,
}
