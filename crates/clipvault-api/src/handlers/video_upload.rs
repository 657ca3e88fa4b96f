use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_video_field;
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use clipvault_core::models::Video;
use std::sync::Arc;
use uuid::Uuid;

/// Upload the asset for a draft video.
///
/// The file is rewritten for fast start, classified by orientation, stored
/// under `<wide|tall|other>/<token>.mp4` and returned with a signed URL.
#[utoipa::path(
    post,
    path = "/api/v0/videos/{video_id}/upload",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Field `video` holding the MP4 file"),
    responses(
        (status = 200, description = "Video uploaded and processed", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Processing or storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, video_id = %video_id, operation = "upload_video")
)]
pub async fn upload_video(
    user: UserContext,
    Path(video_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    // Ownership is settled before the body is read.
    let video = state.pipeline.authorize(video_id, user.user_id).await?;

    let max_bytes = state.pipeline.config().max_video_size_bytes;
    let upload = extract_video_field(multipart, max_bytes).await?;

    tracing::info!(
        size_bytes = upload.size(),
        content_type = %upload.content_type,
        "Uploading video"
    );

    let video = state.pipeline.ingest(video, upload).await?;
    Ok(Json(video))
}
