//! Unit tests for client module.

use super::*;
use crate::error::{NETWORK_ERROR_MESSAGE, SERVER_ERROR_MESSAGE};
use crate::transport::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Transport that replays a canned outcome and records every request.
struct FakeTransport {
    outcome: Box<dyn Fn() -> Result<TransportResponse, TransportError> + Send + Sync>,
    seen: Arc<Mutex<Vec<TransportRequest>>>,
}

impl FakeTransport {
    fn respond(status: u16, body: &str) -> (Self, Arc<Mutex<Vec<TransportRequest>>>) {
        let body = body.as_bytes().to_vec();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = Self {
            outcome: Box::new(move || {
                Ok(TransportResponse {
                    status,
                    headers: Vec::new(),
                    body: body.clone(),
                })
            }),
            seen: Arc::clone(&seen),
        };
        (transport, seen)
    }

    fn json(status: u16, payload: Value) -> (Self, Arc<Mutex<Vec<TransportRequest>>>) {
        Self::respond(status, &payload.to_string())
    }

    fn failing(make: fn() -> TransportError) -> Self {
        Self {
            outcome: Box::new(move || Err(make())),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.seen.lock().push(request);
        (self.outcome)()
    }
}

/// Transport that never answers within any reasonable timeout.
struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(TransportResponse {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

fn client_with(transport: FakeTransport) -> TypedHttpClient {
    TypedHttpClient::builder(ClientConfig::with_base_url("http://api.test/"))
        .transport(transport)
        .build()
        .unwrap()
}

fn client_with_token(transport: FakeTransport, token: &str) -> TypedHttpClient {
    TypedHttpClient::builder(ClientConfig::with_base_url("http://api.test"))
        .transport(transport)
        .token_store(Arc::new(MemoryTokenStore::with_entry("token", token)))
        .build()
        .unwrap()
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_client_new_default_config() {
    let client = TypedHttpClient::new(ClientConfig::default());

    assert!(client.is_ok());
}

#[test]
fn test_client_base_url_trimmed() {
    let client = TypedHttpClient::with_base_url("http://localhost:8080/").unwrap();

    assert_eq!(client.base_url(), "http://localhost:8080");
    assert_eq!(client.config().base_url, "http://localhost:8080/");
}

#[test]
fn test_client_rejects_invalid_url() {
    let err = TypedHttpClient::with_base_url("not a url").unwrap_err();

    assert!(matches!(err, BuildError::InvalidUrl(_)));
}

#[test]
fn test_client_rejects_non_http_scheme() {
    let err = TypedHttpClient::with_base_url("ftp://files.example.com").unwrap_err();

    assert!(matches!(err, BuildError::UnsupportedScheme(ref s) if s == "ftp"));
}

#[test]
fn test_client_rejects_invalid_default_header() {
    let config = ClientConfig::default().header("Bad Header", "x");
    let err = TypedHttpClient::new(config).unwrap_err();

    assert!(matches!(err, BuildError::InvalidHeader { ref name, .. } if name == "Bad Header"));
}

// ============================================================================
// Success Path Tests
// ============================================================================

#[tokio::test]
async fn test_get_list_returns_envelope() {
    let (transport, _) = FakeTransport::json(200, json!([{ "id": "1" }]));
    let client = client_with(transport);

    let resp = client.get::<Vec<User>>("/").await.unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(
        resp.data,
        vec![User {
            id: "1".to_string(),
            name: None
        }]
    );
    assert_eq!(resp.message.as_deref(), Some("OK"));
}

#[tokio::test]
async fn test_envelope_status_matches_transport() {
    let (transport, _) = FakeTransport::json(201, json!({ "id": "7", "name": "a" }));
    let client = client_with(transport);

    let resp = client
        .post::<User, _>("/users", &json!({ "name": "a" }))
        .await
        .unwrap();

    assert_eq!(resp.status, 201);
    assert_eq!(resp.data.id, "7");
    assert_eq!(resp.data.name.as_deref(), Some("a"));
}

#[tokio::test]
async fn test_empty_body_decodes_as_unit() {
    let (transport, _) = FakeTransport::respond(204, "");
    let client = client_with(transport);

    let resp = client.delete::<()>("/users/1").await.unwrap();

    assert_eq!(resp.status, 204);
    assert_eq!(resp.message.as_deref(), Some("No Content"));
}

#[tokio::test]
async fn test_empty_body_decodes_as_none() {
    let (transport, _) = FakeTransport::respond(200, "");
    let client = client_with(transport);

    let resp = client.get::<Option<User>>("/maybe").await.unwrap();

    assert!(resp.data.is_none());
}

// ============================================================================
// Error Path Tests
// ============================================================================

#[tokio::test]
async fn test_post_unprocessable_uses_server_message() {
    let (transport, _) = FakeTransport::json(422, json!({ "message": "invalid" }));
    let client = client_with(transport);

    let err = client
        .post::<User, _>("/", &json!({ "name": "a" }))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 422);
    assert_eq!(err.message(), "invalid");
    assert_eq!(err.data(), Some(&json!({ "message": "invalid" })));
}

#[tokio::test]
async fn test_error_without_message_falls_back() {
    let (transport, _) = FakeTransport::json(503, json!({ "code": "UNAVAILABLE" }));
    let client = client_with(transport);

    let err = client.get::<Value>("/status").await.unwrap_err();

    assert_eq!(err.status(), 503);
    assert_eq!(err.message(), SERVER_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_error_with_plain_text_body() {
    let (transport, _) = FakeTransport::respond(502, "upstream exploded");
    let client = client_with(transport);

    let err = client.get::<Value>("/").await.unwrap_err();

    assert_eq!(err.status(), 502);
    assert_eq!(err.message(), "Server Error");
    assert_eq!(err.data(), Some(&json!("upstream exploded")));
}

#[tokio::test]
async fn test_error_with_empty_body_has_no_payload() {
    let (transport, _) = FakeTransport::respond(404, "");
    let client = client_with(transport);

    let err = client.get::<Value>("/missing").await.unwrap_err();

    assert_eq!(err.status(), 404);
    assert!(err.data().is_none());
}

#[tokio::test]
async fn test_timeout_maps_to_network_error() {
    let client = client_with(FakeTransport::failing(|| TransportError::Timeout));

    let err = client.get::<Value>("/").await.unwrap_err();

    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
    assert!(err.is_network_error());
    assert!(err.data().is_none());
}

#[tokio::test]
async fn test_connect_failure_maps_to_network_error() {
    let client = client_with(FakeTransport::failing(|| {
        TransportError::Connect("dns lookup failed".to_string())
    }));

    let err = client.put::<Value, _>("/x", &json!({})).await.unwrap_err();

    assert_eq!(err.status(), 500);
    assert!(err.is_network_error());
}

#[tokio::test]
async fn test_undecodable_success_body_is_error() {
    let (transport, _) = FakeTransport::json(200, json!({ "unexpected": true }));
    let client = client_with(transport);

    let err = client.get::<Vec<User>>("/").await.unwrap_err();

    assert_eq!(err.status(), 200);
    assert!(err.message().starts_with("Failed to decode response body"));
    assert_eq!(err.data(), Some(&json!({ "unexpected": true })));
}

#[tokio::test]
async fn test_configured_timeout_enforced_on_custom_transport() {
    let client = TypedHttpClient::builder(
        ClientConfig::default().timeout(Duration::from_millis(50)),
    )
    .transport(HangingTransport)
    .build()
    .unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), client.get::<Value>("/slow")).await;
    let err = result.expect("client timeout not enforced").unwrap_err();

    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
    assert!(err.is_network_error());
}

#[tokio::test]
async fn test_per_call_timeout_enforced_on_custom_transport() {
    let client = TypedHttpClient::builder(ClientConfig::default())
        .transport(HangingTransport)
        .build()
        .unwrap();

    let options = RequestOptions::new().timeout(Duration::from_millis(50));
    let result =
        tokio::time::timeout(Duration::from_secs(2), client.get_with::<Value>("/", options)).await;
    let err = result.expect("per-call timeout not enforced").unwrap_err();

    assert!(err.is_network_error());
}

#[tokio::test]
async fn test_invalid_token_is_not_network_error() {
    let (transport, seen) = FakeTransport::json(200, json!(null));
    let client = client_with_token(transport, "abc\ndef");

    let err = client.get::<Value>("/").await.unwrap_err();

    assert_eq!(err.status(), 500);
    assert!(err.message().starts_with("Invalid header Authorization"));
    assert!(!err.is_network_error());
    assert!(seen.lock().is_empty());
}

#[tokio::test]
async fn test_invalid_option_header_is_not_network_error() {
    let (transport, seen) = FakeTransport::json(200, json!(null));
    let client = client_with(transport);

    let options = RequestOptions::new().header("Bad Header", "x");
    let err = client.get_with::<Value>("/", options).await.unwrap_err();

    assert!(err.message().starts_with("Invalid header Bad Header"));
    assert!(!err.is_network_error());
    assert!(seen.lock().is_empty());
}

// ============================================================================
// Request Hook Tests
// ============================================================================

#[tokio::test]
async fn test_token_present_adds_bearer_header() {
    let (transport, seen) = FakeTransport::json(200, json!(null));
    let client = client_with_token(transport, "secret");

    client.get::<Value>("/a").await.unwrap();
    client.delete::<Value>("/b").await.unwrap();
    client.post::<Value, _>("/c", &json!({})).await.unwrap();
    client.put::<Value, _>("/d", &json!({})).await.unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 4);
    for req in seen.iter() {
        assert_eq!(req.header("authorization"), Some("Bearer secret"));
    }
}

#[tokio::test]
async fn test_token_absent_adds_no_header() {
    let (transport, seen) = FakeTransport::json(200, json!(null));
    let client = client_with(transport);

    client.get::<Value>("/a").await.unwrap();

    assert!(seen.lock()[0].header("Authorization").is_none());
}

#[tokio::test]
async fn test_token_read_on_every_call() {
    let (transport, seen) = FakeTransport::json(200, json!(null));
    let tokens = Arc::new(MemoryTokenStore::new());
    let client = TypedHttpClient::builder(ClientConfig::default())
        .transport(transport)
        .token_store(tokens.clone())
        .build()
        .unwrap();

    client.get::<Value>("/").await.unwrap();
    tokens.set("token", "late");
    client.get::<Value>("/").await.unwrap();

    let seen = seen.lock();
    assert!(seen[0].header("Authorization").is_none());
    assert_eq!(seen[1].header("Authorization"), Some("Bearer late"));
}

#[tokio::test]
async fn test_default_content_type_and_body() {
    let (transport, seen) = FakeTransport::json(200, json!({ "id": "1" }));
    let client = client_with(transport);

    client
        .post::<User, _>("users", &User {
            id: "1".to_string(),
            name: Some("a".to_string()),
        })
        .await
        .unwrap();

    let seen = seen.lock();
    let req = &seen[0];
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.url, "http://api.test/users");
    assert_eq!(req.header("content-type"), Some("application/json"));
    let body: Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "id": "1", "name": "a" }));
}

#[tokio::test]
async fn test_options_override_headers_query_and_timeout() {
    let (transport, seen) = FakeTransport::json(200, json!([]));
    let client = client_with(transport);

    let options = RequestOptions::new()
        .header("content-type", "application/merge-patch+json")
        .header("X-Trace", "t-1")
        .query("q", "a b")
        .query("page", "2")
        .timeout(Duration::from_millis(150));
    client.get_with::<Vec<User>>("/users", options).await.unwrap();

    let seen = seen.lock();
    let req = &seen[0];
    assert_eq!(req.url, "http://api.test/users?q=a+b&page=2");
    assert_eq!(req.header("Content-Type"), Some("application/merge-patch+json"));
    assert_eq!(req.header("x-trace"), Some("t-1"));
    assert_eq!(req.timeout, Duration::from_millis(150));
}

#[tokio::test]
async fn test_post_without_body() {
    let (transport, seen) = FakeTransport::json(200, json!(null));
    let client = client_with(transport);

    client
        .post_with::<(), Value>("/ping", None, RequestOptions::default())
        .await
        .unwrap();

    assert!(seen.lock()[0].body.is_none());
}

// ============================================================================
// Interceptor Tests
// ============================================================================

#[derive(Default)]
struct Counting {
    requests: AtomicUsize,
    responses: AtomicUsize,
    errors: AtomicUsize,
}

impl Interceptor for Arc<Counting> {
    fn on_request(&self, req: &mut TransportRequest) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        req.set_header("X-Intercepted", "yes");
    }

    fn on_response(&self, _req: &TransportRequest, _resp: &TransportResponse) {
        self.responses.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, _req: &TransportRequest, _err: &RequestError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_interceptors_run_on_success() {
    let counting = Arc::new(Counting::default());
    let (transport, seen) = FakeTransport::json(200, json!(1));
    let client = TypedHttpClient::builder(ClientConfig::default())
        .transport(transport)
        .interceptor(Arc::clone(&counting))
        .build()
        .unwrap();

    client.get::<u32>("/").await.unwrap();

    assert_eq!(counting.requests.load(Ordering::SeqCst), 1);
    assert_eq!(counting.responses.load(Ordering::SeqCst), 1);
    assert_eq!(counting.errors.load(Ordering::SeqCst), 0);
    assert_eq!(seen.lock()[0].header("X-Intercepted"), Some("yes"));
}

#[tokio::test]
async fn test_interceptors_run_on_error() {
    let counting = Arc::new(Counting::default());
    let (transport, _) = FakeTransport::json(400, json!({ "message": "bad" }));
    let client = TypedHttpClient::builder(ClientConfig::default())
        .transport(transport)
        .interceptor(Arc::clone(&counting))
        .interceptor(crate::interceptor::TracingInterceptor)
        .build()
        .unwrap();

    let err = client.get::<u32>("/").await.unwrap_err();

    assert_eq!(err.message(), "bad");
    assert_eq!(counting.responses.load(Ordering::SeqCst), 0);
    assert_eq!(counting.errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_interceptors_run_on_encode_error() {
    let counting = Arc::new(Counting::default());
    let (transport, seen) = FakeTransport::json(200, json!(null));
    let client = TypedHttpClient::builder(ClientConfig::default())
        .transport(transport)
        .interceptor(Arc::clone(&counting))
        .build()
        .unwrap();

    let mut body = std::collections::HashMap::new();
    body.insert((1, 2), 3);
    let err = client.post::<Value, _>("/", &body).await.unwrap_err();

    assert_eq!(err.status(), 500);
    assert!(err.message().starts_with("Failed to encode request body"));
    assert!(!err.is_network_error());
    assert_eq!(counting.errors.load(Ordering::SeqCst), 1);
    assert!(seen.lock().is_empty());
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let (transport, seen) = FakeTransport::json(200, json!({ "id": "1" }));
    let client = client_with_token(transport, "t");

    let mut handles = Vec::new();
    for i in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.get::<User>(&format!("/users/{i}")).await
        }));
    }
    for handle in handles {
        let resp = handle.await.unwrap().unwrap();
        assert_eq!(resp.status, 200);
    }

    assert_eq!(seen.lock().len(), 8);
}
