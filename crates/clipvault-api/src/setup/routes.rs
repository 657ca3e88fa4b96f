//! Route configuration and setup.

use crate::auth::middleware::{auth_middleware, AuthState};
use crate::constants::{API_PREFIX, ASSETS_PREFIX, HTTP_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use clipvault_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: state.jwt.clone(),
    });

    let protected = protected_routes(config).layer(axum::middleware::from_fn_with_state(
        auth_state,
        auth_middleware,
    ));

    tracing::info!(
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        "HTTP concurrency limit layer enabled"
    );

    let app = public_routes()
        .merge(protected)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.base.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .base
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .route(
            &format!("{}/{{*key}}", ASSETS_PREFIX),
            get(handlers::assets::serve_asset),
        )
}

fn protected_routes(config: &Config) -> Router<Arc<AppState>> {
    let upload_limit = usize::try_from(config.video.max_video_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(handlers::videos::create_video).get(handlers::videos::list_videos),
        )
        .route(
            &format!("{}/videos/{{id}}", API_PREFIX),
            get(handlers::videos::get_video),
        )
        .route(
            &format!("{}/videos/{{video_id}}/upload", API_PREFIX),
            post(handlers::video_upload::upload_video).layer(DefaultBodyLimit::max(upload_limit)),
        )
}
