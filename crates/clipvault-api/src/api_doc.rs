//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use clipvault_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipvault API",
        version = "0.1.0",
        description = "Video ingestion API (v0). Uploaded MP4s are rewritten for fast start, classified by orientation and served through short-lived signed URLs."
    ),
    paths(
        handlers::health::health_check,
        handlers::videos::create_video,
        handlers::videos::get_video,
        handlers::videos::list_videos,
        handlers::video_upload::upload_video,
    ),
    components(schemas(
        models::Video,
        models::CreateVideoRequest,
        error::ErrorResponse,
        handlers::health::HealthCheckResponse,
    )),
    modifiers(&BearerAuth),
    security(("bearer_auth" = [])),
    tags(
        (name = "videos", description = "Video records and uploads"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
