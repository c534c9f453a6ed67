//! Typed HTTP client with uniform response envelopes.
//!
//! Every call against a [`TypedHttpClient`] ends either in an
//! [`ApiResponse`] carrying the decoded payload and the transport's status,
//! or in a [`RequestError`] carrying a status, a message and the raw payload.
//! Before each request the client looks up a bearer token in its
//! [`TokenStore`] and attaches `Authorization: Bearer <token>` when one is
//! present.
//!
//! # Example
//!
//! ```no_run
//! use typed_http_client::{ClientConfig, TypedHttpClient};
//! use serde::Deserialize;
//! use std::time::Duration;
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: String,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TypedHttpClient::new(
//!         ClientConfig::with_base_url("http://localhost:8080").timeout(Duration::from_secs(5)),
//!     )?;
//!
//!     let users = client.get::<Vec<User>>("/api/v1/users").await?;
//!     println!("{} users (status {})", users.data.len(), users.status);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod envelope;
mod error;
mod interceptor;
mod token;
mod transport;

pub use client::{ClientBuilder, TypedHttpClient};
pub use config::{ClientConfig, DEFAULT_TIMEOUT, DEFAULT_TOKEN_KEY, RequestOptions};
pub use envelope::ApiResponse;
pub use error::{
    BuildError, NETWORK_ERROR_MESSAGE, NETWORK_FAILURE_STATUS, RequestError, SERVER_ERROR_MESSAGE,
};
pub use interceptor::{Interceptor, TracingInterceptor};
pub use reqwest::Method;
pub use token::{DEFAULT_ENV_PREFIX, EnvTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{
    ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse,
};
