//! Uniform success shape returned by every client operation.

use serde::{Deserialize, Serialize};

/// Successful call result.
///
/// `status` is always the status reported by the transport and `data` is the
/// decoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Decoded response payload.
    pub data: T,
    /// HTTP status reported by the transport.
    pub status: u16,
    /// Canonical reason phrase for the status, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Builds an envelope, filling `message` with the status' reason phrase.
    #[must_use]
    pub fn new(data: T, status: u16) -> Self {
        let message = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .map(str::to_string);

        Self {
            data,
            status,
            message,
        }
    }

    /// Consumes the envelope and returns the payload.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Maps the payload, keeping status and message.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            status: self.status,
            message: self.message,
        }
    }
}
