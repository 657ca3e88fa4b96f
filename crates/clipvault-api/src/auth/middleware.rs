use crate::auth::jwt::JwtService;
use crate::auth::models::UserContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use clipvault_core::AppError;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
}

/// Require `Authorization: Bearer <jwt>` and attach the caller's [`UserContext`].
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return HttpAppError(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        ))
        .into_response();
    };

    let claims = match auth_state.jwt.validate_token(token.trim()) {
        Ok(claims) => claims,
        Err(e) => return HttpAppError(e).into_response(),
    };

    let user = UserContext::from(&claims);
    tracing::debug!(user_id = %user.user_id, "Authenticated request");
    request.extensions_mut().insert(user);
    next.run(request).await
}
