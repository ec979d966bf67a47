//! SQLite implementation of the [`Store`] trait.
//!
//! All timestamps are bound from the application as `chrono::DateTime<Utc>`
//! (RFC 3339 text in the database), so decoding is uniform. Balance
//! mutations are single `UPDATE ... SET balance = balance + ?` statements,
//! and every compound billing operation runs inside one SQL transaction with
//! the debit guarded by `balance >= total` in its WHERE clause.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};

use nimbus_core::{
    add_months, NewServerConfig, NewTransaction, ServerConfig, ServerConfigUpdate, ServerStatus,
    Transaction, TransactionType, User, UserId, UserProfile, UserServer,
};

use crate::error::{Result, StoreError};
use crate::schema;
use crate::Store;

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path, apply the schema,
    /// and seed the default catalog.
    ///
    /// Enables WAL journal mode, foreign keys, and a 5-second busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the schema fails to
    /// apply.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Database(e.to_string()))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        tracing::info!(path = %path.display(), "Database opened");

        Ok(store)
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the schema fails to apply.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Database(e.to_string()))?
            .foreign_keys(true);

        // A single connection keeps every query on the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Apply DDL and seed the default catalog.
    async fn init_schema(&self) -> Result<()> {
        for stmt in schema::TABLES.iter().chain(schema::INDEXES) {
            sqlx::query(stmt).execute(&self.pool).await?;
        }

        let now = Utc::now();
        for seed in schema::SEED_CONFIGS {
            let features = serde_json::to_string(seed.features)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            sqlx::query(
                r"
                INSERT OR IGNORE INTO server_configs
                (name, cpu_cores, ram_gb, storage_gb, storage_type, bandwidth_gb,
                 price_monthly, max_websites, features, is_active, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
                ",
            )
            .bind(seed.name)
            .bind(seed.cpu_cores)
            .bind(seed.ram_gb)
            .bind(seed.storage_gb)
            .bind(seed.storage_type)
            .bind(seed.bandwidth_gb)
            .bind(seed.price_monthly)
            .bind(seed.max_websites)
            .bind(&features)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        }

        tracing::debug!("Schema applied and catalog seeded");

        Ok(())
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    email: Option<String>,
    avatar_url: Option<String>,
    balance: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row
                .id
                .parse()
                .map_err(|e| StoreError::Serialization(format!("user id: {e}")))?,
            username: row.username,
            email: row.email,
            avatar_url: row.avatar_url,
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ConfigRow {
    id: i64,
    name: String,
    cpu_cores: i64,
    ram_gb: f64,
    storage_gb: i64,
    storage_type: String,
    bandwidth_gb: i64,
    price_monthly: i64,
    max_websites: i64,
    features: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ConfigRow> for ServerConfig {
    type Error = StoreError;

    fn try_from(row: ConfigRow) -> Result<Self> {
        let features: Vec<String> = serde_json::from_str(&row.features)
            .map_err(|e| StoreError::Serialization(format!("config features: {e}")))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            cpu_cores: row.cpu_cores,
            ram_gb: row.ram_gb,
            storage_gb: row.storage_gb,
            storage_type: row.storage_type,
            bandwidth_gb: row.bandwidth_gb,
            price_monthly: row.price_monthly,
            max_websites: row.max_websites,
            features,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ServerRow {
    id: i64,
    user_id: String,
    config_id: i64,
    server_name: String,
    status: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ServerRow> for UserServer {
    type Error = StoreError;

    fn try_from(row: ServerRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row
                .user_id
                .parse()
                .map_err(|e| StoreError::Serialization(format!("server user id: {e}")))?,
            config_id: row.config_id,
            server_name: row.server_name,
            status: row
                .status
                .parse()
                .map_err(|e| StoreError::Serialization(format!("server status: {e}")))?,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    user_id: String,
    #[sqlx(rename = "type")]
    kind: String,
    amount: i64,
    description: String,
    reference_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row
                .user_id
                .parse()
                .map_err(|e| StoreError::Serialization(format!("transaction user id: {e}")))?,
            kind: row
                .kind
                .parse()
                .map_err(|e| StoreError::Serialization(format!("transaction type: {e}")))?,
            amount: row.amount,
            description: row.description,
            reference_id: row.reference_id,
            created_at: row.created_at,
        })
    }
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Debit `total` from the user inside an open transaction, guarded against
/// overdraft. Returns the new balance.
async fn guarded_debit(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    user_id: &UserId,
    total: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    let new_balance: Option<i64> = sqlx::query_scalar(
        r"
        UPDATE users
        SET balance = balance - ?, updated_at = ?
        WHERE id = ? AND balance >= ?
        RETURNING balance
        ",
    )
    .bind(total)
    .bind(now)
    .bind(user_id.as_str())
    .bind(total)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(balance) = new_balance {
        return Ok(balance);
    }

    // Distinguish a missing user from an overdraft.
    let current: Option<i64> = sqlx::query_scalar("SELECT balance FROM users WHERE id = ?")
        .bind(user_id.as_str())
        .fetch_optional(&mut **tx)
        .await?;

    match current {
        Some(current) => Err(StoreError::InsufficientBalance {
            current,
            required: total,
        }),
        None => Err(StoreError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        }),
    }
}

/// Append a ledger entry inside an open transaction.
async fn append_transaction(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    entry: &NewTransaction,
    now: DateTime<Utc>,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r"
        INSERT INTO transactions (user_id, type, amount, description, reference_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        ",
    )
    .bind(entry.user_id.as_str())
    .bind(entry.kind.as_str())
    .bind(entry.amount)
    .bind(&entry.description)
    .bind(entry.reference_id)
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert_user(&self, profile: &UserProfile) -> Result<User> {
        let now = Utc::now();

        sqlx::query(
            r"
            INSERT INTO users (id, username, email, avatar_url, balance, created_at, updated_at)
            VALUES (?, ?, ?, ?, 0, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                email = excluded.email,
                avatar_url = excluded.avatar_url,
                updated_at = excluded.updated_at
            ",
        )
        .bind(profile.id.as_str())
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.avatar_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_user(&profile.id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "user",
                id: profile.id.to_string(),
            })
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows =
            sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;
        collect(rows)
    }

    async fn get_balance(&self, id: &UserId) -> Result<i64> {
        sqlx::query_scalar("SELECT balance FROM users WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "user",
                id: id.to_string(),
            })
    }

    async fn adjust_balance(&self, id: &UserId, delta: i64) -> Result<i64> {
        sqlx::query_scalar(
            "UPDATE users SET balance = balance + ?, updated_at = ? WHERE id = ? RETURNING balance",
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            entity: "user",
            id: id.to_string(),
        })
    }

    async fn delete_user(&self, id: &UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "user",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn list_active_configs(&self) -> Result<Vec<ServerConfig>> {
        let rows = sqlx::query_as::<_, ConfigRow>(
            "SELECT * FROM server_configs WHERE is_active = 1 ORDER BY price_monthly ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn list_configs(&self) -> Result<Vec<ServerConfig>> {
        let rows =
            sqlx::query_as::<_, ConfigRow>("SELECT * FROM server_configs ORDER BY price_monthly ASC")
                .fetch_all(&self.pool)
                .await?;
        collect(rows)
    }

    async fn get_config(&self, id: i64) -> Result<Option<ServerConfig>> {
        sqlx::query_as::<_, ConfigRow>("SELECT * FROM server_configs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ServerConfig::try_from)
            .transpose()
    }

    async fn create_config(&self, new: &NewServerConfig) -> Result<ServerConfig> {
        let now = Utc::now();
        let features = serde_json::to_string(&new.features)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let row = sqlx::query_as::<_, ConfigRow>(
            r"
            INSERT INTO server_configs
            (name, cpu_cores, ram_gb, storage_gb, storage_type, bandwidth_gb,
             price_monthly, max_websites, features, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            RETURNING *
            ",
        )
        .bind(&new.name)
        .bind(new.cpu_cores)
        .bind(new.ram_gb)
        .bind(new.storage_gb)
        .bind(&new.storage_type)
        .bind(new.bandwidth_gb)
        .bind(new.price_monthly)
        .bind(new.max_websites)
        .bind(&features)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update_config(&self, id: i64, changes: &ServerConfigUpdate) -> Result<bool> {
        if changes.is_empty() {
            return Ok(false);
        }

        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE server_configs SET ");
        let mut fields = builder.separated(", ");

        if let Some(name) = &changes.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(cpu_cores) = changes.cpu_cores {
            fields.push("cpu_cores = ").push_bind_unseparated(cpu_cores);
        }
        if let Some(ram_gb) = changes.ram_gb {
            fields.push("ram_gb = ").push_bind_unseparated(ram_gb);
        }
        if let Some(storage_gb) = changes.storage_gb {
            fields.push("storage_gb = ").push_bind_unseparated(storage_gb);
        }
        if let Some(storage_type) = &changes.storage_type {
            fields
                .push("storage_type = ")
                .push_bind_unseparated(storage_type);
        }
        if let Some(bandwidth_gb) = changes.bandwidth_gb {
            fields
                .push("bandwidth_gb = ")
                .push_bind_unseparated(bandwidth_gb);
        }
        if let Some(price_monthly) = changes.price_monthly {
            fields
                .push("price_monthly = ")
                .push_bind_unseparated(price_monthly);
        }
        if let Some(max_websites) = changes.max_websites {
            fields
                .push("max_websites = ")
                .push_bind_unseparated(max_websites);
        }
        if let Some(features) = &changes.features {
            let features = serde_json::to_string(features)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            fields.push("features = ").push_bind_unseparated(features);
        }

        builder.push(", updated_at = ").push_bind(Utc::now());
        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_config_active(&self, id: i64, active: bool) -> Result<bool> {
        let result =
            sqlx::query("UPDATE server_configs SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(active)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_server(&self, id: i64) -> Result<Option<UserServer>> {
        sqlx::query_as::<_, ServerRow>("SELECT * FROM user_servers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(UserServer::try_from)
            .transpose()
    }

    async fn list_servers_by_user(&self, user_id: &UserId) -> Result<Vec<UserServer>> {
        let rows = sqlx::query_as::<_, ServerRow>(
            "SELECT * FROM user_servers WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn update_server_status(&self, id: i64, status: ServerStatus) -> Result<bool> {
        let result =
            sqlx::query("UPDATE user_servers SET status = ?, updated_at = ? WHERE id = ?")
                .bind(status.as_str())
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_expired_servers(&self) -> Result<Vec<UserServer>> {
        let rows = sqlx::query_as::<_, ServerRow>(
            "SELECT * FROM user_servers WHERE status = 'active' AND expires_at < ?",
        )
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn record_transaction(&self, entry: &NewTransaction) -> Result<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r"
            INSERT INTO transactions (user_id, type, amount, description, reference_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(entry.user_id.as_str())
        .bind(entry.kind.as_str())
        .bind(entry.amount)
        .bind(&entry.description)
        .bind(entry.reference_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(user_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn total_deposits(&self, user_id: &UserId) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE user_id = ? AND type = ?",
        )
        .bind(user_id.as_str())
        .bind(TransactionType::Deposit.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn total_spending(&self, user_id: &UserId) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(ABS(amount)), 0) FROM transactions WHERE user_id = ? AND type = ?",
        )
        .bind(user_id.as_str())
        .bind(TransactionType::Purchase.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn deposit(&self, user_id: &UserId, amount: i64) -> Result<i64> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let new_balance: Option<i64> = sqlx::query_scalar(
            "UPDATE users SET balance = balance + ?, updated_at = ? WHERE id = ? RETURNING balance",
        )
        .bind(amount)
        .bind(now)
        .bind(user_id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let new_balance = new_balance.ok_or_else(|| StoreError::NotFound {
            entity: "user",
            id: user_id.to_string(),
        })?;

        append_transaction(&mut tx, &NewTransaction::deposit(user_id.clone(), amount), now)
            .await?;

        tx.commit().await?;

        tracing::debug!(user_id = %user_id, amount, new_balance, "Deposit recorded");

        Ok(new_balance)
    }

    async fn purchase_server(
        &self,
        user_id: &UserId,
        config: &ServerConfig,
        server_name: &str,
        months: u32,
    ) -> Result<(UserServer, i64)> {
        let now = Utc::now();
        let total = config.price_for(months);
        let expires_at = add_months(now, months);

        let mut tx = self.pool.begin().await?;

        let new_balance = guarded_debit(&mut tx, user_id, total, now).await?;

        let server_row = sqlx::query_as::<_, ServerRow>(
            r"
            INSERT INTO user_servers
            (user_id, config_id, server_name, status, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, 'active', ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(user_id.as_str())
        .bind(config.id)
        .bind(server_name)
        .bind(expires_at)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let entry = NewTransaction::purchase(
            user_id.clone(),
            total,
            format!(
                "Purchased {} server '{}' for {} month(s)",
                config.name, server_name, months
            ),
            server_row.id,
        );
        append_transaction(&mut tx, &entry, now).await?;

        tx.commit().await?;

        let server = UserServer::try_from(server_row)?;

        tracing::debug!(
            user_id = %user_id,
            server_id = server.id,
            config = %config.name,
            total,
            new_balance,
            "Server purchased"
        );

        Ok((server, new_balance))
    }

    async fn extend_server(
        &self,
        user_id: &UserId,
        server: &UserServer,
        config: &ServerConfig,
        months: u32,
    ) -> Result<(DateTime<Utc>, i64)> {
        let now = Utc::now();
        let total = config.price_for(months);

        let mut tx = self.pool.begin().await?;

        let new_balance = guarded_debit(&mut tx, user_id, total, now).await?;

        // Re-read the expiry inside the transaction so concurrent extensions
        // stack instead of clobbering each other.
        let expires_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT expires_at FROM user_servers WHERE id = ?")
                .bind(server.id)
                .fetch_optional(&mut *tx)
                .await?;

        let expires_at = expires_at.ok_or_else(|| StoreError::NotFound {
            entity: "server",
            id: server.id.to_string(),
        })?;
        let new_expiry = add_months(expires_at, months);

        sqlx::query("UPDATE user_servers SET expires_at = ?, updated_at = ? WHERE id = ?")
            .bind(new_expiry)
            .bind(now)
            .bind(server.id)
            .execute(&mut *tx)
            .await?;

        let entry = NewTransaction::purchase(
            user_id.clone(),
            total,
            format!(
                "Extended server '{}' by {} month(s)",
                server.server_name, months
            ),
            server.id,
        );
        append_transaction(&mut tx, &entry, now).await?;

        tx.commit().await?;

        tracing::debug!(
            user_id = %user_id,
            server_id = server.id,
            total,
            new_balance,
            new_expiry = %new_expiry,
            "Server extended"
        );

        Ok((new_expiry, new_balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn profile(id: &str, username: &str) -> UserProfile {
        UserProfile {
            id: id.parse().unwrap(),
            username: username.into(),
            email: Some(format!("{username}@example.com")),
            avatar_url: None,
        }
    }

    async fn store_with_user(balance: i64) -> (SqliteStore, UserId) {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let user = store
            .upsert_user(&profile("80351110224678912", "mascot"))
            .await
            .unwrap();
        if balance != 0 {
            store.adjust_balance(&user.id, balance).await.unwrap();
        }
        (store, user.id)
    }

    async fn config_by_name(store: &SqliteStore, name: &str) -> ServerConfig {
        store
            .list_configs()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap()
    }

    #[tokio::test]
    async fn seeds_default_catalog() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let configs = store.list_active_configs().await.unwrap();

        let names: Vec<_> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Kitten", "Cat", "Lion"]); // price ascending

        let lion = &configs[2];
        assert_eq!(lion.price_monthly, 200_000);
        assert!(lion.unlimited_bandwidth());
        assert!(lion.unlimited_websites());
        assert_eq!(lion.features.len(), 5);
    }

    #[tokio::test]
    async fn upsert_preserves_balance_and_updates_profile() {
        let (store, user_id) = store_with_user(12_345).await;

        let updated = store
            .upsert_user(&profile("80351110224678912", "renamed"))
            .await
            .unwrap();

        assert_eq!(updated.username, "renamed");
        assert_eq!(updated.balance, 12_345);
        assert_eq!(updated.id, user_id);
    }

    #[tokio::test]
    async fn list_users_returns_every_account() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store
            .upsert_user(&profile("80351110224678912", "mascot"))
            .await
            .unwrap();
        store
            .upsert_user(&profile("90351110224678913", "admin"))
            .await
            .unwrap();

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
    }

    #[tokio::test]
    async fn balance_of_unknown_user_is_not_found() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let ghost: UserId = "999".parse().unwrap();

        assert!(matches!(
            store.get_balance(&ghost).await,
            Err(StoreError::NotFound { entity: "user", .. })
        ));
        assert!(matches!(
            store.adjust_balance(&ghost, 100).await,
            Err(StoreError::NotFound { entity: "user", .. })
        ));
    }

    #[tokio::test]
    async fn deposit_credits_balance_and_appends_ledger() {
        let (store, user_id) = store_with_user(0).await;

        let balance = store.deposit(&user_id, 300_000).await.unwrap();
        assert_eq!(balance, 300_000);

        let ledger = store.list_transactions_by_user(&user_id, 50).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, TransactionType::Deposit);
        assert_eq!(ledger[0].amount, 300_000);

        assert_eq!(store.total_deposits(&user_id).await.unwrap(), 300_000);
    }

    #[tokio::test]
    async fn purchase_debits_and_creates_server_and_ledger() {
        let (store, user_id) = store_with_user(300_000).await;
        let cat = config_by_name(&store, "Cat").await;

        let (server, balance) = store
            .purchase_server(&user_id, &cat, "web-01", 2)
            .await
            .unwrap();

        assert_eq!(balance, 100_000);
        assert_eq!(server.user_id, user_id);
        assert_eq!(server.config_id, cat.id);
        assert_eq!(server.status, ServerStatus::Active);

        let servers = store.list_servers_by_user(&user_id).await.unwrap();
        assert_eq!(servers.len(), 1);

        let ledger = store.list_transactions_by_user(&user_id, 50).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].kind, TransactionType::Purchase);
        assert_eq!(ledger[0].amount, -200_000);
        assert_eq!(ledger[0].reference_id, Some(server.id));

        assert_eq!(store.total_spending(&user_id).await.unwrap(), 200_000);
    }

    #[tokio::test]
    async fn purchase_with_insufficient_balance_persists_nothing() {
        let (store, user_id) = store_with_user(100_000).await;
        let lion = config_by_name(&store, "Lion").await;

        let err = store
            .purchase_server(&user_id, &lion, "web-01", 1)
            .await
            .unwrap_err();

        match err {
            StoreError::InsufficientBalance { current, required } => {
                assert_eq!(current, 100_000);
                assert_eq!(required, 200_000);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(store.get_balance(&user_id).await.unwrap(), 100_000);
        assert!(store.list_servers_by_user(&user_id).await.unwrap().is_empty());
        assert!(store
            .list_transactions_by_user(&user_id, 50)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn extend_pushes_expiry_by_calendar_months() {
        let (store, user_id) = store_with_user(500_000).await;
        let cat = config_by_name(&store, "Cat").await;

        let (server, _) = store
            .purchase_server(&user_id, &cat, "web-01", 1)
            .await
            .unwrap();

        let (new_expiry, balance) = store
            .extend_server(&user_id, &server, &cat, 3)
            .await
            .unwrap();

        assert_eq!(new_expiry, add_months(server.expires_at, 3));
        assert_eq!(balance, 500_000 - 100_000 - 300_000);

        let reloaded = store.get_server(server.id).await.unwrap().unwrap();
        assert_eq!(reloaded.expires_at, new_expiry);
        // Month arithmetic, not 30-day blocks.
        assert_eq!(
            reloaded.expires_at.month0(),
            add_months(server.expires_at, 3).month0()
        );

        let ledger = store.list_transactions_by_user(&user_id, 50).await.unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn expired_listing_only_returns_lapsed_active_servers() {
        let (store, user_id) = store_with_user(1_000_000).await;
        let kitten = config_by_name(&store, "Kitten").await;

        let (expired, _) = store
            .purchase_server(&user_id, &kitten, "old", 1)
            .await
            .unwrap();
        let (suspended, _) = store
            .purchase_server(&user_id, &kitten, "paused", 1)
            .await
            .unwrap();
        let (_current, _) = store
            .purchase_server(&user_id, &kitten, "fresh", 12)
            .await
            .unwrap();

        // Backdate two of them past their term.
        let past = Utc::now() - chrono::Duration::days(1);
        for id in [expired.id, suspended.id] {
            sqlx::query("UPDATE user_servers SET expires_at = ? WHERE id = ?")
                .bind(past)
                .bind(id)
                .execute(store.pool())
                .await
                .unwrap();
        }
        store
            .update_server_status(suspended.id, ServerStatus::Suspended)
            .await
            .unwrap();

        let lapsed = store.list_expired_servers().await.unwrap();
        assert_eq!(lapsed.len(), 1);
        assert_eq!(lapsed[0].id, expired.id);
    }

    #[tokio::test]
    async fn config_admin_edits_apply_partially() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let cat = config_by_name(&store, "Cat").await;

        let changed = store
            .update_config(
                cat.id,
                &ServerConfigUpdate {
                    price_monthly: Some(120_000),
                    features: Some(vec!["Free SSL".into(), "Daily backups".into()]),
                    ..ServerConfigUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(changed);

        let cat = store.get_config(cat.id).await.unwrap().unwrap();
        assert_eq!(cat.price_monthly, 120_000);
        assert_eq!(cat.features.len(), 2);
        assert_eq!(cat.cpu_cores, 2); // untouched

        assert!(!store
            .update_config(cat.id, &ServerConfigUpdate::default())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn deactivated_config_leaves_active_listing() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let cat = config_by_name(&store, "Cat").await;

        assert!(store.set_config_active(cat.id, false).await.unwrap());

        let active = store.list_active_configs().await.unwrap();
        assert!(active.iter().all(|c| c.name != "Cat"));
        assert_eq!(store.list_configs().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn deleting_user_cascades_servers_and_ledger() {
        let (store, user_id) = store_with_user(300_000).await;
        let kitten = config_by_name(&store, "Kitten").await;
        store
            .purchase_server(&user_id, &kitten, "web-01", 1)
            .await
            .unwrap();

        store.delete_user(&user_id).await.unwrap();

        assert!(store.get_user(&user_id).await.unwrap().is_none());
        assert!(store.list_servers_by_user(&user_id).await.unwrap().is_empty());
        assert!(store
            .list_transactions_by_user(&user_id, 50)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn create_config_returns_stored_row() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let created = store
            .create_config(&NewServerConfig {
                name: "Tiger".into(),
                cpu_cores: 8,
                ram_gb: 16.0,
                storage_gb: 200,
                storage_type: "NVMe SSD Gen 4".into(),
                bandwidth_gb: 0,
                price_monthly: 400_000,
                max_websites: 0,
                features: vec!["Everything".into()],
            })
            .await
            .unwrap();

        assert!(created.is_active);
        assert_eq!(created.name, "Tiger");
        let reloaded = store.get_config(created.id).await.unwrap().unwrap();
        assert_eq!(reloaded.price_monthly, 400_000);
    }
}
