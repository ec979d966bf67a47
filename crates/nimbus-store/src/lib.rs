//! Storage layer for the Nimbus Hosting account service.
//!
//! This crate defines one repository interface, the [`Store`] trait, and its
//! SQLite implementation [`SqliteStore`]. The backend is chosen once at
//! composition time; an alternative engine would be a second `Store`
//! implementation, not a parallel source tree.
//!
//! # Billing atomicity
//!
//! The balance-affecting flows (deposit, purchase, extension) are compound
//! operations on the trait, and the SQLite implementation runs each inside a
//! single SQL transaction. The debit statement carries a `balance >= total`
//! guard, so two concurrent purchases against the same user cannot drive the
//! balance negative and a failure at any step persists nothing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod schema;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use nimbus_core::{
    NewServerConfig, NewTransaction, ServerConfig, ServerConfigUpdate, ServerStatus, Transaction,
    User, UserId, UserProfile, UserServer,
};

/// The storage trait defining all database operations.
///
/// Object-safe so the service can hold an `Arc<dyn Store>` and pick the
/// backend at composition time.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Insert a user with zero balance, or update the mutable profile fields
    /// of an existing row. Returns the stored record.
    async fn upsert_user(&self, profile: &UserProfile) -> Result<User>;

    /// Get a user by id.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// List all users, newest first (administrative).
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Get a user's current balance.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist.
    async fn get_balance(&self, id: &UserId) -> Result<i64>;

    /// Atomically add `delta` (positive or negative) to a user's balance in a
    /// single statement, returning the new balance.
    ///
    /// This is the raw primitive; the compound billing operations below are
    /// the only callers that debit, and they guard against overdraft.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist.
    async fn adjust_balance(&self, id: &UserId, delta: i64) -> Result<i64>;

    /// Delete a user. Servers and transactions cascade at the storage layer.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist.
    async fn delete_user(&self, id: &UserId) -> Result<()>;

    // =========================================================================
    // Catalog operations
    // =========================================================================

    /// List purchasable tiers, cheapest first.
    async fn list_active_configs(&self) -> Result<Vec<ServerConfig>>;

    /// List all tiers including deactivated ones, cheapest first.
    async fn list_configs(&self) -> Result<Vec<ServerConfig>>;

    /// Get a tier by id.
    async fn get_config(&self, id: i64) -> Result<Option<ServerConfig>>;

    /// Create a tier (administrative).
    async fn create_config(&self, new: &NewServerConfig) -> Result<ServerConfig>;

    /// Apply a partial tier edit (administrative). Returns `false` when the
    /// update is empty or the tier does not exist.
    async fn update_config(&self, id: i64, changes: &ServerConfigUpdate) -> Result<bool>;

    /// Activate or deactivate a tier (administrative). Returns `false` when
    /// the tier does not exist.
    async fn set_config_active(&self, id: i64, active: bool) -> Result<bool>;

    // =========================================================================
    // Server operations
    // =========================================================================

    /// Get a purchased server by id.
    async fn get_server(&self, id: i64) -> Result<Option<UserServer>>;

    /// List a user's servers, newest first.
    async fn list_servers_by_user(&self, user_id: &UserId) -> Result<Vec<UserServer>>;

    /// Set a server's lifecycle status (administrative). Returns `false` when
    /// the server does not exist.
    async fn update_server_status(&self, id: i64, status: ServerStatus) -> Result<bool>;

    /// List servers whose paid term has lapsed while still active.
    ///
    /// Polling contract for an external expiry sweep; nothing in this service
    /// consumes it.
    async fn list_expired_servers(&self) -> Result<Vec<UserServer>>;

    // =========================================================================
    // Ledger operations
    // =========================================================================

    /// Append a ledger entry. The ledger is append-only; there is no update
    /// or delete counterpart.
    async fn record_transaction(&self, tx: &NewTransaction) -> Result<Transaction>;

    /// List a user's ledger entries, newest first.
    async fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>>;

    /// Sum of all deposit amounts for a user.
    async fn total_deposits(&self, user_id: &UserId) -> Result<i64>;

    /// Sum of absolute purchase amounts for a user.
    async fn total_spending(&self, user_id: &UserId) -> Result<i64>;

    // =========================================================================
    // Compound billing operations (single SQL transaction each)
    // =========================================================================

    /// Credit `amount` to the user and append the matching deposit entry.
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist.
    async fn deposit(&self, user_id: &UserId, amount: i64) -> Result<i64>;

    /// Purchase a server: debit `config.price_for(months)`, create the server
    /// row with `expires_at = now + months` calendar months, and append the
    /// purchase entry referencing the new row. Returns the server and the new
    /// balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user does not exist.
    /// - `StoreError::InsufficientBalance` if the balance does not cover the
    ///   total; nothing is persisted in that case.
    async fn purchase_server(
        &self,
        user_id: &UserId,
        config: &ServerConfig,
        server_name: &str,
        months: u32,
    ) -> Result<(UserServer, i64)>;

    /// Extend a server: debit `config.price_for(months)` and push
    /// `expires_at` out by `months` calendar months, appending the purchase
    /// entry. Returns the new expiry and the new balance.
    ///
    /// The caller is responsible for the ownership check; this operation
    /// trusts `server` as loaded.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the user or server row vanished.
    /// - `StoreError::InsufficientBalance` if the balance does not cover the
    ///   total; nothing is persisted in that case.
    async fn extend_server(
        &self,
        user_id: &UserId,
        server: &UserServer,
        config: &ServerConfig,
        months: u32,
    ) -> Result<(DateTime<Utc>, i64)>;
}
