//! Common test utilities for nimbus-service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;

use nimbus_core::{UserId, UserProfile};
use nimbus_service::{create_router, AppState, ServiceConfig, SessionData};
use nimbus_store::{SqliteStore, Store};

/// A stable snowflake for the default test user.
pub const TEST_USER_ID: &str = "80351110224678912";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Application state, for direct store and session access.
    pub state: AppState,
}

impl TestHarness {
    /// Create a new test harness over a fresh in-memory database.
    pub async fn new() -> Self {
        Self::with_config(ServiceConfig::default()).await
    }

    /// Create a harness with a custom configuration.
    pub async fn with_config(config: ServiceConfig) -> Self {
        let store = SqliteStore::open_in_memory()
            .await
            .expect("Failed to open store");

        let state = AppState::new(Arc::new(store), config);
        let router: Router = create_router(state.clone());

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, state }
    }

    /// Create a harness whose Discord client points at a local double.
    pub async fn with_discord(api_base: &str) -> Self {
        let config = ServiceConfig {
            discord_client_id: Some("1234".into()),
            discord_client_secret: Some("client-secret".into()),
            discord_api_base: api_base.to_string(),
            ..ServiceConfig::default()
        };
        Self::with_config(config).await
    }

    /// Create a user row plus a logged-in session, returning the `Cookie`
    /// header value for requests on their behalf.
    pub async fn login_as(&self, id: &str, username: &str) -> String {
        let user_id: UserId = id.parse().expect("valid snowflake");

        self.state
            .store
            .upsert_user(&UserProfile {
                id: user_id.clone(),
                username: username.into(),
                email: None,
                avatar_url: None,
            })
            .await
            .expect("Failed to upsert user");

        let token = self
            .state
            .sessions
            .create(SessionData {
                user_id: Some(user_id),
                username: Some(username.into()),
                ..SessionData::default()
            })
            .await;

        format!("nimbus_session={token}")
    }

    /// Credit a user's balance directly through the store.
    pub async fn fund(&self, id: &str, amount: i64) {
        let user_id: UserId = id.parse().expect("valid snowflake");
        self.state
            .store
            .adjust_balance(&user_id, amount)
            .await
            .expect("Failed to fund user");
    }

    /// Read a user's balance directly through the store.
    pub async fn balance(&self, id: &str) -> i64 {
        let user_id: UserId = id.parse().expect("valid snowflake");
        self.state
            .store
            .get_balance(&user_id)
            .await
            .expect("Failed to read balance")
    }

    /// Look up a seeded tier id by name.
    pub async fn config_id(&self, name: &str) -> i64 {
        self.state
            .store
            .list_configs()
            .await
            .expect("Failed to list configs")
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.id)
            .expect("seeded config")
    }
}
