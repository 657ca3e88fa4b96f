//! Health check handler

use crate::constants::HEALTH_CHECK_TIMEOUT_SECS;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
}

/// Run an async check with timeout; returns "healthy", "timeout", or "unhealthy: {error}".
async fn run_check<F, E>(timeout: Duration, f: F) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("unhealthy: {}", e),
        Err(_) => "timeout".to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthCheckResponse),
        (status = 503, description = "A dependency is unreachable", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

    let database = match state.pool.clone() {
        Some(pool) => {
            run_check(timeout, async move {
                sqlx::query("SELECT 1").execute(&pool).await.map(drop)
            })
            .await
        }
        None => "in-memory".to_string(),
    };

    let storage = state.storage.clone();
    let storage = run_check(timeout, async move {
        storage.exists("health-check-non-existent-key").await.map(drop)
    })
    .await;

    let healthy = database != "timeout"
        && !database.starts_with("unhealthy")
        && storage == "healthy";
    let status_code = if healthy {
        StatusCode::OK
    } else {
        tracing::warn!(database = %database, storage = %storage, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            database,
            storage,
        }),
    )
}
