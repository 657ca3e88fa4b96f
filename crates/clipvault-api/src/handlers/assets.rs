use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use clipvault_core::AppError;
use clipvault_storage::Storage;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: u64,
    pub signature: String,
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Stream a local-storage object behind a signed URL.
#[tracing::instrument(skip(state, query), fields(key = %key))]
pub async fn serve_asset(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<SignedQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let local = state
        .local_assets
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Asset serving is not enabled".to_string()))?;

    local.verify_signature(&key, query.expires, &query.signature)?;

    let stream = local.download_stream(&key).await?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&key)),
            (header::CACHE_CONTROL, "private, no-store"),
        ],
        Body::from_stream(stream),
    ))
}
