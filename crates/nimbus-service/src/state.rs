//! Application state.

use std::sync::Arc;

use nimbus_store::Store;

use crate::config::ServiceConfig;
use crate::discord::DiscordClient;
use crate::session::SessionStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend, chosen at composition time.
    pub store: Arc<dyn Store>,

    /// The in-memory session store. Starts empty, dropped on shutdown.
    pub sessions: SessionStore,

    /// Discord OAuth client (optional; login is disabled without it).
    pub discord: Option<Arc<DiscordClient>>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let discord = config
            .discord_client_id
            .as_ref()
            .zip(config.discord_client_secret.as_ref())
            .and_then(|(id, secret)| {
                match DiscordClient::new(
                    id,
                    secret,
                    &config.discord_redirect_uri,
                    &config.discord_api_base,
                    &config.discord_cdn_base,
                ) {
                    Ok(client) => {
                        tracing::info!(client_id = %id, "Discord OAuth enabled");
                        Some(Arc::new(client))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to create Discord client");
                        None
                    }
                }
            });

        if discord.is_none() {
            tracing::warn!("Discord OAuth not configured - login will be unavailable");
        }

        Self {
            store,
            sessions: SessionStore::new(),
            discord,
            config,
        }
    }

    /// Check if Discord OAuth is configured.
    #[must_use]
    pub fn has_discord(&self) -> bool {
        self.discord.is_some()
    }
}
