//! Transport abstraction and the default reqwest-backed implementation.
//!
//! A transport only moves bytes: every HTTP status, including 4xx/5xx, comes
//! back as a [`TransportResponse`]. [`TransportError`] is reserved for calls
//! that never produced a response.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Request handed to a transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully resolved URL, query string included.
    pub url: String,
    /// Header pairs in send order.
    pub headers: Vec<(String, String)>,
    /// Encoded body.
    pub body: Option<Vec<u8>>,
    /// Upper bound for the whole call.
    pub timeout: Duration,
}

impl TransportRequest {
    /// Looks up a header value, ignoring name case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Inserts a header, replacing any existing one with the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }
}

/// Raw response produced by a transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The transport could not produce a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Timeout elapsed before the response completed.
    #[error("request timed out")]
    Timeout,

    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other failure below HTTP.
    #[error("transport failure: {0}")]
    Other(String),
}

/// Moves a request over the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and waits for the full response.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Default transport over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport whose connection pool enforces `timeout`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Other(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::Other(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(headers)
            .timeout(request.timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.bytes().await.map_err(map_reqwest_error)?.to_vec();

        debug!(status, bytes = body.len(), "transport response received");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
