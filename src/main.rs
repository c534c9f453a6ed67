//! typed-http backend server
//!
//! Reference users API for exercising the typed HTTP client.

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use typed_http_backend::build_app;
use typed_http_backend::config::Config;
use typed_http_backend::error::ErrorResponse;
use typed_http_backend::models::{
    HealthResponse, MeResponse, SlowResponse, User, UserRequest,
};
use typed_http_backend::state::AppState;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        typed_http_backend::api::handlers::health_check,
        typed_http_backend::api::handlers::list_users,
        typed_http_backend::api::handlers::create_user,
        typed_http_backend::api::handlers::get_user,
        typed_http_backend::api::handlers::update_user,
        typed_http_backend::api::handlers::delete_user,
        typed_http_backend::api::handlers::me,
        typed_http_backend::api::handlers::slow,
    ),
    components(
        schemas(
            HealthResponse,
            User,
            UserRequest,
            MeResponse,
            SlowResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Users", description = "User management"),
        (name = "Auth", description = "Bearer token protected routes"),
        (name = "Diagnostics", description = "Client behaviour helpers"),
    ),
    info(
        title = "typed-http reference API",
        version = "0.1.0",
        description = "In-memory users API for exercising the typed HTTP client",
        license(name = "MIT"),
        contact(name = "Joaquin Bejar", email = "jb@taunais.com")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration, falling back to defaults when no file is given
    let config = match std::env::var("CONFIG_PATH") {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            Config::load(&path).with_context(|| format!("loading {path}"))?
        }
        Err(_) => Config::default(),
    }
    .apply_env()?;

    let state = Arc::new(AppState::from_config(&config));
    if state.auth_token.is_none() {
        info!("No auth token configured; any bearer token is accepted on /api/v1/me");
    }

    let addr = config.bind_addr();
    info!("Starting typed-http reference API on {}", addr);
    info!("Swagger UI available at http://{}/swagger-ui/", addr);

    let app = build_app(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
