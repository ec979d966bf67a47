//! User account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A user account.
///
/// Users are created on first login with a zero balance; subsequent logins
/// update the mutable profile fields only. The balance is the single source
/// of truth for purchasing power and is never persisted negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID (Discord snowflake, stable across logins).
    pub id: UserId,

    /// Current username from the identity provider.
    pub username: String,

    /// Email, if the identity provider shared one.
    pub email: Option<String>,

    /// Resolved avatar URL (CDN or default avatar).
    pub avatar_url: Option<String>,

    /// Current balance in whole currency units.
    pub balance: i64,

    /// When the account was first created.
    pub created_at: DateTime<Utc>,

    /// When the profile or balance last changed.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check whether the balance covers a debit of `amount`.
    #[must_use]
    pub fn has_sufficient_balance(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

/// Profile fields synced from the identity provider on every login.
///
/// This is the input to the upsert-on-login operation: the id selects the
/// row, the remaining fields overwrite the stored profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user ID.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Email, if shared.
    pub email: Option<String>,
    /// Resolved avatar URL.
    pub avatar_url: Option<String>,
}
