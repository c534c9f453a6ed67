//! # typed-http backend - reference users API
//!
//! A small in-memory REST API built with [Axum](https://crates.io/crates/axum)
//! that the `typed-http-client` crate is exercised against. Every error is
//! rendered as `{ "message": ..., "code": ... }`, which is the shape the
//! client reads its failure message from, and one route is gated on an
//! `Authorization: Bearer` token.
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/users` | List users |
//! | POST | `/api/v1/users` | Create user (422 on blank name) |
//! | GET | `/api/v1/users/{id}` | Get user |
//! | PUT | `/api/v1/users/{id}` | Rename user |
//! | DELETE | `/api/v1/users/{id}` | Delete user (204) |
//! | GET | `/api/v1/me` | Requires bearer token |
//! | GET | `/api/v1/slow?ms=N` | Responds after N ms |
//!
//! ## Starting the Server
//!
//! ```bash
//! # Development mode
//! cargo run
//!
//! # With a config file and custom port
//! CONFIG_PATH=config.toml PORT=3000 cargo run
//! ```
//!
//! Swagger UI is served at `/swagger-ui/`.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod state;

use crate::api::create_router;
use crate::state::AppState;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the router with CORS and request tracing layers.
pub fn build_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serves the API on an already bound listener until the task is dropped.
///
/// # Errors
/// Returns error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, build_app(state)).await
}
