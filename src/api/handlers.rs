//! API request handlers.

use crate::error::ApiError;
use crate::models::{
    HealthResponse, MeResponse, SlowQuery, SlowResponse, User, UserRequest,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Upper bound for the slow route delay.
pub const MAX_SLOW_MS: u64 = 10_000;

/// Parses a user id path segment; malformed ids are reported as not found.
fn parse_user_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::UserNotFound(id.to_string()))
}

fn validated_name(request: &UserRequest) -> Result<&str, ApiError> {
    request
        .valid_name()
        .ok_or_else(|| ApiError::Validation("name must not be blank".to_string()))
}

/// Fallback for paths no route matches.
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

// ============================================================================
// Health
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Users
// ============================================================================

/// List all users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "List of users", body = [User])
    ),
    tag = "Users"
)]
pub async fn list_users(State(state): State<Arc<AppState>>) -> Json<Vec<User>> {
    Json(state.list_users())
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 422, description = "Blank name", body = crate::error::ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(request) = payload?;
    let name = validated_name(&request)?;
    let user = state.insert_user(name);
    info!(id = %user.id, "Created user");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let uuid = parse_user_id(&id)?;
    state
        .users
        .get(&uuid)
        .map(|entry| Json(entry.value().clone()))
        .ok_or(ApiError::UserNotFound(id))
}

/// Rename a user.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Blank name", body = crate::error::ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(request) = payload?;
    let uuid = parse_user_id(&id)?;
    let name = validated_name(&request)?;

    let mut entry = state
        .users
        .get_mut(&uuid)
        .ok_or(ApiError::UserNotFound(id))?;
    entry.name = name.to_string();

    Ok(Json(entry.value().clone()))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    ),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let uuid = parse_user_id(&id)?;
    match state.users.remove(&uuid) {
        Some(_) => {
            info!(id = %uuid, "Deleted user");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::UserNotFound(id)),
    }
}

// ============================================================================
// Identity & Diagnostics
// ============================================================================

/// Identity of the caller; requires a bearer token.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Bearer token accepted", body = MeResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn me() -> Json<MeResponse> {
    Json(MeResponse {
        authenticated: true,
        scheme: "Bearer".to_string(),
    })
}

/// Responds after a delay, for exercising client timeouts.
#[utoipa::path(
    get,
    path = "/api/v1/slow",
    params(SlowQuery),
    responses(
        (status = 200, description = "Delay elapsed", body = SlowResponse)
    ),
    tag = "Diagnostics"
)]
pub async fn slow(Query(query): Query<SlowQuery>) -> Json<SlowResponse> {
    let ms = query.ms.min(MAX_SLOW_MS);
    tokio::time::sleep(Duration::from_millis(ms)).await;

    Json(SlowResponse { slept_ms: ms })
}
