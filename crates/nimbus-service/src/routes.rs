//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, configs, contact, health, user};
use crate::state::AppState;

/// Maximum concurrent requests for the `/api` surface.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /auth/discord` - Redirect to Discord authorization
/// - `GET /auth/discord/callback` - OAuth callback
/// - `POST /auth/logout` - Delete session
/// - `GET /api/user` - Authentication status (never 401)
/// - `GET /api/configs`, `GET /api/configs/:id` - Tier catalog
/// - `POST /api/contact` - Contact form
///
/// ## Session-cookie protected
/// - `GET /api/user/balance`
/// - `POST /api/user/deposit`
/// - `GET /api/user/transactions`
/// - `GET /api/user/servers`, `POST /api/user/servers`
/// - `POST /api/user/servers/:id/extend`
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/user", get(auth::current_user))
        .route("/user/balance", get(user::get_balance))
        .route("/user/deposit", post(user::deposit))
        .route("/user/transactions", get(user::list_transactions))
        .route(
            "/user/servers",
            get(user::list_servers).post(user::purchase_server),
        )
        .route("/user/servers/:id/extend", post(user::extend_server))
        .route("/configs", get(configs::list_configs))
        .route("/configs/:id", get(configs::get_config))
        .route("/contact", post(contact::submit))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no concurrency limit)
        .route("/health", get(health::health))
        // OAuth flow
        .route("/auth/discord", get(auth::login))
        .route("/auth/discord/callback", get(auth::callback))
        .route("/auth/logout", post(auth::logout))
        // JSON API
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
