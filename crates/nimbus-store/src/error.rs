//! Error types for the storage layer.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// A stored value could not be decoded (corrupt enum string, bad JSON).
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record ("user", "config", "server").
        entity: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// Balance does not cover the requested debit.
    #[error("insufficient balance: current={current}, required={required}")]
    InsufficientBalance {
        /// Current balance in whole currency units.
        current: i64,
        /// Required amount in whole currency units.
        required: i64,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
