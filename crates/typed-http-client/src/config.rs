//! Client and per-call configuration.

use std::collections::HashMap;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Key looked up in the token store before each request.
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Client configuration, fixed for the lifetime of a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Headers sent with every request.
    pub default_headers: HashMap<String, String>,
    /// Token store key holding the bearer credential.
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: DEFAULT_TIMEOUT,
            default_headers,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at `base_url`.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds or replaces a default header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

/// Optional per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers; win over default headers of the same name.
    pub headers: HashMap<String, String>,
    /// Query string pairs appended to the URL.
    pub query: Vec<(String, String)>,
    /// Timeout for this call only.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a query pair.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Overrides the timeout for this call.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
