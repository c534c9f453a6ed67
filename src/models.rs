//! Request and response models for the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// A stored user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Body for creating or renaming a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRequest {
    /// Display name; must not be blank.
    #[serde(default)]
    pub name: String,
}

impl UserRequest {
    /// Trimmed name, or `None` when blank.
    #[must_use]
    pub fn valid_name(&self) -> Option<&str> {
        let name = self.name.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// Response of the protected identity route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    /// Always true once the bearer check passed.
    pub authenticated: bool,
    /// Authentication scheme used.
    pub scheme: String,
}

/// Query for the slow route.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlowQuery {
    /// Delay in milliseconds (capped).
    #[serde(default)]
    pub ms: u64,
}

/// Response of the slow route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlowResponse {
    /// Delay actually applied.
    pub slept_ms: u64,
}
