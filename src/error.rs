//! Error types for the REST API.
//!
//! Every [`ApiError`] renders as `{ "message": ..., "code": ... }`, the shape
//! the typed client reads its failure message from. JSON body rejections and
//! unknown routes are routed through [`ApiError`] as well.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;


/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub message: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Request body failed validation.
    #[error("{0}")]
    Validation(String),

    /// Missing or wrong bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Request body could not be read as JSON.
    #[error("{message}")]
    Rejected {
        /// Status chosen by the extractor.
        status: StatusCode,
        /// Extractor message.
        message: String,
    },

    /// No route matches the request path.
    #[error("Route not found: {0}")]
    RouteNotFound(String),
}

impl ApiError {
    /// Status code and machine readable code for this error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::UserNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Rejected { status, .. } => (*status, "INVALID_REQUEST"),
            ApiError::RouteNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            message: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
