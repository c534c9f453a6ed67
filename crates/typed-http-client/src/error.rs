//! Error types for the typed HTTP client.
//!
//! Every failed call surfaces as a [`RequestError`]. Construction problems
//! (bad base URL, bad default header, transport build failure) are reported
//! separately through [`BuildError`] since no request is involved yet.

use serde_json::Value;
use thiserror::Error;


/// Status used when the transport produced no response at all.
pub const NETWORK_FAILURE_STATUS: u16 = 500;

/// Message used when the transport produced no response at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error";

/// Message used when a non-2xx response carries no usable `message` field.
pub const SERVER_ERROR_MESSAGE: &str = "Server Error";

/// The single error kind returned by every client operation.
///
/// Built once per failed call and never mutated afterwards; fields are only
/// reachable through accessors.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("request failed ({status}): {message}")]
pub struct RequestError {
    status: u16,
    message: String,
    data: Option<Value>,
    network: bool,
}

impl RequestError {
    /// Creates an error for a response the server rejected.
    #[must_use]
    pub fn new(status: u16, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
            network: false,
        }
    }

    /// Creates an error from a non-2xx response payload.
    ///
    /// The message is taken from the payload's string `message` field when
    /// present, otherwise [`SERVER_ERROR_MESSAGE`] is used.
    #[must_use]
    pub fn from_response(status: u16, data: Option<Value>) -> Self {
        let message = data
            .as_ref()
            .and_then(|payload| payload.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map_or_else(|| SERVER_ERROR_MESSAGE.to_string(), str::to_string);

        Self::new(status, message, data)
    }

    /// Creates the error for a call where the transport never responded.
    #[must_use]
    pub fn network() -> Self {
        Self {
            status: NETWORK_FAILURE_STATUS,
            message: NETWORK_ERROR_MESSAGE.to_string(),
            data: None,
            network: true,
        }
    }

    /// HTTP status of the failure (500 when no response was received).
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Human readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw payload returned by the server, if any.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Returns true when the transport never produced a response.
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        self.network
    }

    /// Returns true for 4xx statuses.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Returns true for 5xx statuses, including network failures.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Errors raised while building a client.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base URL parsed but is not an http(s) URL.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// A default header name or value is not valid HTTP.
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name as configured.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The underlying HTTP client could not be built.
    #[error("HTTP client build failed: {0}")]
    Http(#[from] reqwest::Error),
}
