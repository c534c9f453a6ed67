//! End-to-end test support for the typed HTTP client.
//!
//! Each test spawns the reference API on an ephemeral local port and talks to
//! it through a real [`TypedHttpClient`]. Set `API_BASE_URL` to run the same
//! tests against an already running server instead.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use typed_http_backend::state::AppState;
use typed_http_client::{ClientConfig, MemoryTokenStore, TokenStore, TypedHttpClient};

/// Token the spawned server accepts on protected routes.
pub const TEST_TOKEN: &str = "test-token";

/// User as seen by the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Running server handle; the server stops when the handle is dropped.
pub struct TestServer {
    /// Base URL of the server.
    pub base_url: String,
    handle: Option<tokio::task::JoinHandle<std::io::Result<()>>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Starts the reference API, or points at `API_BASE_URL` when set.
///
/// # Panics
/// Panics if no local port can be bound.
pub async fn start_server() -> TestServer {
    if let Ok(base_url) = std::env::var("API_BASE_URL") {
        return TestServer {
            base_url,
            handle: None,
        };
    }

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no local address");
    let state = Arc::new(AppState {
        auth_token: Some(TEST_TOKEN.to_string()),
        ..AppState::new()
    });
    let handle = tokio::spawn(typed_http_backend::serve(listener, state));

    TestServer {
        base_url: format!("http://{addr}"),
        handle: Some(handle),
    }
}

/// Creates a client with a short timeout and the given token store.
///
/// # Panics
/// Panics if client creation fails.
pub fn create_test_client(base_url: &str, tokens: Arc<dyn TokenStore>) -> TypedHttpClient {
    TypedHttpClient::builder(
        ClientConfig::with_base_url(base_url).timeout(Duration::from_secs(5)),
    )
    .token_store(tokens)
    .build()
    .expect("Failed to create client")
}

/// Client without any token.
#[must_use]
pub fn anonymous_client(base_url: &str) -> TypedHttpClient {
    create_test_client(base_url, Arc::new(MemoryTokenStore::new()))
}

/// Client carrying [`TEST_TOKEN`].
#[must_use]
pub fn authenticated_client(base_url: &str) -> TypedHttpClient {
    create_test_client(
        base_url,
        Arc::new(MemoryTokenStore::with_entry("token", TEST_TOKEN)),
    )
}

/// Generates a unique user name to avoid conflicts between tests.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}_{}_{}", prefix, ts, counter)
}
