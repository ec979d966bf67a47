//! Nimbus Hosting account service - HTTP API entry point.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nimbus_service::{create_router, AppState, ServiceConfig};
use nimbus_store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nimbus=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Nimbus Hosting service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_path = %config.database_path,
        environment = %config.environment,
        discord_configured = %config.discord_client_id.is_some(),
        "Service configuration loaded"
    );

    // Open the database, applying schema and seed catalog
    let store = Arc::new(SqliteStore::open(Path::new(&config.database_path)).await?);

    // Build app state
    let state = AppState::new(store, config.clone());

    // Start the session sweep; sessions are process-local and die with us
    let sweeper = state.sessions.spawn_sweeper(
        Duration::from_secs(config.session_max_age_seconds),
        Duration::from_secs(config.session_sweep_interval_seconds),
    );

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server closed");

    Ok(())
}

/// Resolve when the process receives ctrl-c.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, draining connections");
}
