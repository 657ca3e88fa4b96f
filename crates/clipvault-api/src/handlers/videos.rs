use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use clipvault_core::models::{CreateVideoRequest, Video};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/api/v0/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Draft video created", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, operation = "create_video")
)]
pub async fn create_video(
    user: UserContext,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let video = Video::new(user.user_id, request.title, request.description);
    let video = state.videos.create_video(&video).await?;

    tracing::info!(video_id = %video.id, "Draft video created");
    Ok((StatusCode::CREATED, Json(video)))
}

#[utoipa::path(
    get,
    path = "/api/v0/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video with a signed playback URL", body = Video),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, video_id = %id, operation = "get_video")
)]
pub async fn get_video(
    user: UserContext,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state.pipeline.authorize(id, user.user_id).await?;
    let video = state.pipeline.sign_video(video).await?;
    Ok(Json(video))
}

#[utoipa::path(
    get,
    path = "/api/v0/videos",
    tag = "videos",
    responses(
        (status = 200, description = "The caller's videos, newest first", body = Vec<Video>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, operation = "list_videos")
)]
pub async fn list_videos(
    user: UserContext,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.videos.list_videos(user.user_id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list videos");
        HttpAppError::from(e)
    })?;

    let mut signed = Vec::with_capacity(videos.len());
    for video in videos {
        signed.push(state.pipeline.sign_video(video).await?);
    }

    Ok(Json(signed))
}

