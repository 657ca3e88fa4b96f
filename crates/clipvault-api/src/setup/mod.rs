//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded [`Config`] to a running router.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use clipvault_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.base.environment,
        "Configuration loaded and validated successfully"
    );

    let (pool, videos) = database::setup_database(&config).await?;

    let (storage, local_assets) = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, pool, videos, storage, local_assets)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
