//! Multipart reading for video uploads

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::BytesMut;
use clipvault_core::constants::VIDEO_FORM_FIELD;
use clipvault_core::AppError;
use clipvault_processing::VideoUpload;

fn multipart_error(e: MultipartError) -> AppError {
    // The body limit layer surfaces as a multipart error mid-stream.
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Video file is too large".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", e))
    }
}

/// Read a field chunk by chunk, giving up as soon as it exceeds `max_bytes`.
async fn read_field_capped(mut field: Field<'_>, max_bytes: u64) -> Result<BytesMut, AppError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if (data.len() + chunk.len()) as u64 > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Video file is too large: exceeds the {} byte limit",
                max_bytes
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Extract the `video` field and its declared content type.
///
/// Other fields are skipped. A missing content type is passed through empty
/// so the pipeline reports it.
pub async fn extract_video_field(
    mut multipart: Multipart,
    max_bytes: u64,
) -> Result<VideoUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_FORM_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = read_field_capped(field, max_bytes).await?;
        return Ok(VideoUpload::new(data.freeze(), content_type));
    }

    Err(AppError::BadRequest("Video file missing".to_string()))
}
