//! Typed HTTP client.
//!
//! Every verb, and [`TypedHttpClient::request`], runs the same pipeline:
//! encode the body, resolve URL, merge headers, apply the bearer token, run
//! interceptors, check headers, send under the call's timeout, then shape the
//! outcome into an [`ApiResponse`] or a [`RequestError`].

use crate::config::{ClientConfig, RequestOptions};
use crate::envelope::ApiResponse;
use crate::error::{BuildError, RequestError};
use crate::interceptor::Interceptor;
use crate::token::{MemoryTokenStore, TokenStore};
use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
use reqwest::Method;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

#[cfg(test)]
mod tests;

/// Typed HTTP client bound to one base URL.
///
/// Cheap to clone; clones share configuration, transport, token store and
/// interceptors.
#[derive(Clone)]
pub struct TypedHttpClient {
    config: Arc<ClientConfig>,
    base_url: String,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl std::fmt::Debug for TypedHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedHttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.config.timeout)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

/// Builder for clients that need a custom transport, token store or
/// interceptors.
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    tokens: Option<Arc<dyn TokenStore>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ClientBuilder {
    /// Uses `transport` instead of the default reqwest transport.
    #[must_use]
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses a shared transport.
    #[must_use]
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Reads bearer tokens from `tokens`.
    #[must_use]
    pub fn token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Appends an interceptor.
    #[must_use]
    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    /// Returns error if the base URL or a default header is invalid, or if
    /// the default transport cannot be built.
    pub fn build(self) -> Result<TypedHttpClient, BuildError> {
        let parsed = Url::parse(&self.config.base_url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(BuildError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        for (name, value) in &self.config.default_headers {
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| BuildError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            HeaderValue::from_str(value).map_err(|e| BuildError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(self.config.timeout)?),
        };
        let tokens = self
            .tokens
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        Ok(TypedHttpClient {
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            config: Arc::new(self.config),
            transport,
            tokens,
            interceptors: self.interceptors.into(),
        })
    }
}

impl TypedHttpClient {
    /// Creates a client with the default transport and an empty token store.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, BuildError> {
        Self::builder(config).build()
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid.
    pub fn with_base_url(base_url: &str) -> Result<Self, BuildError> {
        Self::new(ClientConfig::with_base_url(base_url))
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            transport: None,
            tokens: None,
            interceptors: Vec::new(),
        }
    }

    /// Configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Verbs
    // ========================================================================

    /// Performs a GET request.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, RequestError> {
        self.get_with(path, RequestOptions::default()).await
    }

    /// Performs a GET request with per-call options.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, RequestError> {
        self.execute(Method::GET, path, Ok(None), options).await
    }

    /// Performs a POST request with a JSON body.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post_with(path, Some(body), RequestOptions::default()).await
    }

    /// Performs a POST request with an optional body and per-call options.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn post_with<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, path, encode_body(body), options).await
    }

    /// Performs a PUT request with a JSON body.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put_with(path, Some(body), RequestOptions::default()).await
    }

    /// Performs a PUT request with an optional body and per-call options.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn put_with<T, B>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, RequestError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::PUT, path, encode_body(body), options).await
    }

    /// Performs a DELETE request.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, RequestError> {
        self.delete_with(path, RequestOptions::default()).await
    }

    /// Performs a DELETE request with per-call options.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn delete_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, RequestError> {
        self.execute(Method::DELETE, path, Ok(None), options).await
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Runs one call through the full pipeline.
    ///
    /// # Errors
    /// Returns error on transport failure, non-2xx status or undecodable body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, RequestError> {
        self.execute(method, path, encode_body(body.as_ref()), options).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Result<Option<Vec<u8>>, RequestError>,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, RequestError> {
        let (body, encode_error) = match body {
            Ok(body) => (body, None),
            Err(err) => (None, Some(err)),
        };

        let mut req = self.prepare(method, path, body, options);
        if let Some(err) = encode_error {
            return Err(self.fail(&req, err));
        }

        self.apply_request_hooks(&mut req);
        if let Err(err) = validate_headers(&req) {
            return Err(self.fail(&req, err));
        }

        let sent = tokio::time::timeout(req.timeout, self.transport.send(req.clone())).await;
        match sent {
            Ok(Ok(resp)) if resp.is_success() => match decode_success(&resp) {
                Ok(envelope) => {
                    for interceptor in self.interceptors.iter() {
                        interceptor.on_response(&req, &resp);
                    }
                    Ok(envelope)
                }
                Err(err) => Err(self.fail(&req, err)),
            },
            Ok(Ok(resp)) => Err(self.fail(&req, decode_failure(&resp))),
            Ok(Err(err)) => {
                warn!(method = %req.method, url = %req.url, error = %err, "transport failed");
                Err(self.fail(&req, RequestError::network()))
            }
            Err(_) => {
                warn!(
                    method = %req.method,
                    url = %req.url,
                    timeout_ms = req.timeout.as_millis() as u64,
                    "request timed out"
                );
                Err(self.fail(&req, RequestError::network()))
            }
        }
    }

    fn prepare(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        options: RequestOptions,
    ) -> TransportRequest {
        let mut req = TransportRequest {
            method,
            url: self.resolve_url(path, &options.query),
            headers: Vec::with_capacity(self.config.default_headers.len() + options.headers.len()),
            body,
            timeout: options.timeout.unwrap_or(self.config.timeout),
        };

        for (name, value) in &self.config.default_headers {
            req.set_header(name.clone(), value.clone());
        }
        for (name, value) in options.headers {
            req.set_header(name, value);
        }

        req
    }

    fn apply_request_hooks(&self, req: &mut TransportRequest) {
        if let Some(token) = self.tokens.get(&self.config.token_key) {
            req.set_header("Authorization", format!("Bearer {token}"));
        }
        for interceptor in self.interceptors.iter() {
            interceptor.on_request(req);
        }
        debug!(method = %req.method, url = %req.url, "request prepared");
    }

    fn fail(&self, req: &TransportRequest, err: RequestError) -> RequestError {
        for interceptor in self.interceptors.iter() {
            interceptor.on_error(req, &err);
        }
        err
    }

    fn resolve_url(&self, path: &str, query: &[(String, String)]) -> String {
        let mut url = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };

        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }

        url
    }
}

fn encode_body<B: Serialize + ?Sized>(body: Option<&B>) -> Result<Option<Vec<u8>>, RequestError> {
    body.map(serde_json::to_vec)
        .transpose()
        .map_err(|e| RequestError::new(500, format!("Failed to encode request body: {e}"), None))
}

/// Rejects header names or values that cannot go on the wire; nothing has
/// been sent yet, so this is not a network failure.
fn validate_headers(req: &TransportRequest) -> Result<(), RequestError> {
    for (name, value) in &req.headers {
        if let Err(e) = HeaderName::from_bytes(name.as_bytes()) {
            return Err(RequestError::new(500, format!("Invalid header {name}: {e}"), None));
        }
        if let Err(e) = HeaderValue::from_str(value) {
            return Err(RequestError::new(500, format!("Invalid header {name}: {e}"), None));
        }
    }
    Ok(())
}

/// Parses a body as JSON, keeping non-JSON text as a string value.
fn raw_payload(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(body)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(body).into_owned())))
}

fn decode_success<T: DeserializeOwned>(
    resp: &TransportResponse,
) -> Result<ApiResponse<T>, RequestError> {
    let value = raw_payload(&resp.body).unwrap_or(Value::Null);
    match serde_json::from_value::<T>(value.clone()) {
        Ok(data) => Ok(ApiResponse::new(data, resp.status)),
        Err(e) => Err(RequestError::new(
            resp.status,
            format!("Failed to decode response body: {e}"),
            Some(value),
        )),
    }
}

fn decode_failure(resp: &TransportResponse) -> RequestError {
    RequestError::from_response(resp.status, raw_payload(&resp.body))
}
