//! Route configuration.

use crate::api::{handlers, middleware};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;


/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/v1/me", get(handlers::me))
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::require_bearer,
        ));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Users
        .route(
            "/api/v1/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/v1/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // Diagnostics
        .route("/api/v1/slow", get(handlers::slow))
        // Authenticated
        .merge(protected)
        .fallback(handlers::route_not_found)
        .with_state(state)
}
