//! API middleware for bearer authentication.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Authorization scheme accepted by protected routes.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Rejects requests without an accepted `Authorization: Bearer` header.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let accepted = extract_bearer(&request).is_some_and(|token| state.accepts_token(token));

    if !accepted {
        debug!(path = %request.uri().path(), "Rejected request without valid bearer token");
        return ApiError::Unauthorized.into_response();
    }

    next.run(request).await
}

/// Extract the bearer token from a request.
fn extract_bearer(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
}
