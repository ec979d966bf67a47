//! In-memory session store.
//!
//! Sessions map an opaque random token to a small record: the user id once
//! login completes, cached profile fields, the OAuth tokens, and a creation
//! time. The store is process-local and starts empty; it is injected through
//! [`crate::state::AppState`] rather than living in a global, and it drops
//! with the process on shutdown.
//!
//! A background sweep removes records older than the configured maximum age.
//! That sweep is the only autonomous behavior in the service.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use nimbus_core::UserId;

/// Length of a session token in random bytes (64 hex characters on the wire).
const TOKEN_BYTES: usize = 32;

/// A session record.
#[derive(Debug, Clone)]
pub struct Session {
    /// The opaque token, also the map key.
    pub id: String,
    /// The logged-in user, absent until the OAuth callback completes.
    pub user_id: Option<UserId>,
    /// Cached username.
    pub username: Option<String>,
    /// Cached email.
    pub email: Option<String>,
    /// Cached avatar URL.
    pub avatar_url: Option<String>,
    /// OAuth access token.
    pub access_token: Option<String>,
    /// OAuth refresh token.
    pub refresh_token: Option<String>,
    /// Anti-forgery state issued with the authorization redirect, checked on
    /// callback.
    pub oauth_state: Option<String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or updating a session.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// The logged-in user.
    pub user_id: Option<UserId>,
    /// Cached username.
    pub username: Option<String>,
    /// Cached email.
    pub email: Option<String>,
    /// Cached avatar URL.
    pub avatar_url: Option<String>,
    /// OAuth access token.
    pub access_token: Option<String>,
    /// OAuth refresh token.
    pub refresh_token: Option<String>,
    /// Anti-forgery state for the OAuth flow.
    pub oauth_state: Option<String>,
}

/// Process-local session store.
///
/// Cloning is cheap; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session from the given fields and return its token.
    pub async fn create(&self, data: SessionData) -> String {
        let token = random_hex(TOKEN_BYTES);
        let session = Session {
            id: token.clone(),
            user_id: data.user_id,
            username: data.username,
            email: data.email,
            avatar_url: data.avatar_url,
            access_token: data.access_token,
            refresh_token: data.refresh_token,
            oauth_state: data.oauth_state,
            created_at: Utc::now(),
        };

        self.inner.write().await.insert(token.clone(), session);
        token
    }

    /// Look up a session by token.
    pub async fn get(&self, token: &str) -> Option<Session> {
        self.inner.read().await.get(token).cloned()
    }

    /// Apply a mutation to a session. Returns `false` if the token is
    /// unknown.
    pub async fn update(&self, token: &str, f: impl FnOnce(&mut Session)) -> bool {
        match self.inner.write().await.get_mut(token) {
            Some(session) => {
                f(session);
                true
            }
            None => false,
        }
    }

    /// Delete a session. Returns `false` if the token is unknown.
    pub async fn delete(&self, token: &str) -> bool {
        self.inner.write().await.remove(token).is_some()
    }

    /// Remove every session older than `max_age`, returning how many were
    /// dropped.
    pub async fn purge_expired(&self, max_age: Duration) -> usize {
        // An unrepresentable max age degrades to "keep everything".
        let max_age = chrono::Duration::from_std(max_age)
            .unwrap_or_else(|_| chrono::Duration::days(36_500));
        let cutoff = Utc::now() - max_age;
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at > cutoff);
        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Spawn the periodic sweep task.
    ///
    /// The task runs until the returned handle is dropped or aborted (in
    /// practice: until process shutdown).
    pub fn spawn_sweeper(&self, max_age: Duration, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so the sweep
            // cadence starts one full interval from now.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = store.purge_expired(max_age).await;
                if removed > 0 {
                    let remaining = store.len().await;
                    tracing::debug!(removed, remaining, "Session sweep");
                }
            }
        })
    }
}

/// Generate `n` cryptographically random bytes as a lowercase hex string.
#[must_use]
pub fn random_hex(n: usize) -> String {
    let mut bytes = vec![0u8; n];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_get_update_delete_round_trip() {
        let store = SessionStore::new();

        let token = store.create(SessionData::default()).await;
        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));

        let session = store.get(&token).await.unwrap();
        assert!(session.user_id.is_none());

        let updated = store
            .update(&token, |s| {
                s.user_id = Some("80351110224678912".parse().unwrap());
                s.username = Some("mascot".into());
            })
            .await;
        assert!(updated);

        let session = store.get(&token).await.unwrap();
        assert_eq!(session.username.as_deref(), Some("mascot"));

        assert!(store.delete(&token).await);
        assert!(!store.delete(&token).await);
        assert!(store.get(&token).await.is_none());
    }

    #[tokio::test]
    async fn update_unknown_token_is_false() {
        let store = SessionStore::new();
        assert!(!store.update("missing", |_| {}).await);
    }

    #[tokio::test]
    async fn tokens_are_unique() {
        let store = SessionStore::new();
        let a = store.create(SessionData::default()).await;
        let b = store.create(SessionData::default()).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let store = SessionStore::new();

        let old = store.create(SessionData::default()).await;
        let fresh = store.create(SessionData::default()).await;

        // Backdate one session past the max age.
        store
            .update(&old, |s| {
                s.created_at = Utc::now() - chrono::Duration::hours(2);
            })
            .await;

        let removed = store.purge_expired(Duration::from_secs(3600)).await;
        assert_eq!(removed, 1);
        assert!(store.get(&old).await.is_none());

        // The survivor is returned unchanged.
        let session = store.get(&fresh).await.unwrap();
        assert_eq!(session.id, fresh);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_on_interval() {
        let store = SessionStore::new();
        let token = store.create(SessionData::default()).await;
        store
            .update(&token, |s| {
                s.created_at = Utc::now() - chrono::Duration::hours(2);
            })
            .await;

        let handle = store.spawn_sweeper(Duration::from_secs(3600), Duration::from_secs(60));

        // Let the sweeper start its interval before moving the clock, then
        // advance past the first real tick.
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(store.get(&token).await.is_none());
        handle.abort();
    }
}
