//! Balance, ledger, and server purchase handlers.
//!
//! Everything here requires a logged-in session via the [`AuthUser`]
//! extractor. The billing flows validate input first, then delegate to the
//! store's compound operations, which run atomically.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use nimbus_core::{ServerConfig, Transaction, UserServer};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::DataResponse;
use crate::state::AppState;

/// Longest purchasable term in months.
const MAX_TERM_MONTHS: u32 = 24;

/// Default and maximum transaction page sizes.
const DEFAULT_TRANSACTION_LIMIT: u32 = 50;
const MAX_TRANSACTION_LIMIT: u32 = 100;

fn default_months() -> u32 {
    1
}

fn validate_months(months: u32) -> Result<(), ApiError> {
    if months < 1 || months > MAX_TERM_MONTHS {
        return Err(ApiError::validation(
            "months",
            format!("months must be between 1 and {MAX_TERM_MONTHS}"),
        ));
    }
    Ok(())
}

// ============================================================================
// Balance & deposits
// ============================================================================

/// Balance payload.
#[derive(Debug, Serialize)]
pub struct BalanceData {
    /// Current balance in whole currency units.
    pub balance: i64,
}

/// Get the current balance.
pub async fn get_balance(
    State(app): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<DataResponse<BalanceData>>, ApiError> {
    let balance = app.store.get_balance(&auth.user_id).await?;
    Ok(Json(DataResponse::new(BalanceData { balance })))
}

/// Deposit request.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Amount to credit, whole currency units.
    pub amount: i64,
}

/// Credit the balance and append the matching ledger entry.
///
/// The amount is trusted input: there is no payment-gateway integration.
// TODO: integrate a payment gateway before exposing deposits to the public internet.
pub async fn deposit(
    State(app): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<DepositRequest>,
) -> Result<Json<DataResponse<BalanceData>>, ApiError> {
    if body.amount <= 0 {
        return Err(ApiError::validation(
            "amount",
            "amount must be greater than 0",
        ));
    }

    let balance = app.store.deposit(&auth.user_id, body.amount).await?;

    tracing::info!(
        user_id = %auth.user_id,
        amount = body.amount,
        balance,
        "Deposit accepted"
    );

    Ok(Json(DataResponse::new(BalanceData { balance })))
}

// ============================================================================
// Transactions
// ============================================================================

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    /// Maximum number of entries to return (default: 50, cap: 100).
    pub limit: Option<u32>,
}

/// A ledger entry on the wire.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Entry id.
    pub id: i64,
    /// Entry category.
    #[serde(rename = "type")]
    pub kind: String,
    /// Signed amount.
    pub amount: i64,
    /// Description.
    pub description: String,
    /// Linked server id, if any.
    pub reference_id: Option<i64>,
    /// Timestamp, RFC 3339.
    pub created_at: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind.as_str().to_string(),
            amount: tx.amount,
            description: tx.description,
            reference_id: tx.reference_id,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List the caller's ledger entries, newest first.
pub async fn list_transactions(
    State(app): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<DataResponse<Vec<TransactionResponse>>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TRANSACTION_LIMIT)
        .min(MAX_TRANSACTION_LIMIT);

    let transactions = app
        .store
        .list_transactions_by_user(&auth.user_id, limit)
        .await?;
    let transactions = transactions
        .into_iter()
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(DataResponse::new(transactions)))
}

// ============================================================================
// Servers
// ============================================================================

/// A purchased server on the wire, flattened with its tier summary the way
/// the dashboard consumes it.
#[derive(Debug, Serialize)]
pub struct ServerResponse {
    /// Server id.
    pub id: i64,
    /// Purchased tier id.
    pub config_id: i64,
    /// User-chosen name.
    pub server_name: String,
    /// Lifecycle status.
    pub status: String,
    /// End of the paid term, RFC 3339.
    pub expires_at: String,
    /// Purchase time, RFC 3339.
    pub created_at: String,
    /// Tier name, absent if the tier was deleted.
    pub config_name: Option<String>,
    /// Tier CPU cores.
    pub cpu_cores: Option<i64>,
    /// Tier RAM in gigabytes.
    pub ram_gb: Option<f64>,
    /// Tier storage in gigabytes.
    pub storage_gb: Option<i64>,
}

impl ServerResponse {
    fn new(server: UserServer, config: Option<&ServerConfig>) -> Self {
        Self {
            id: server.id,
            config_id: server.config_id,
            server_name: server.server_name,
            status: server.status.as_str().to_string(),
            expires_at: server.expires_at.to_rfc3339(),
            created_at: server.created_at.to_rfc3339(),
            config_name: config.map(|c| c.name.clone()),
            cpu_cores: config.map(|c| c.cpu_cores),
            ram_gb: config.map(|c| c.ram_gb),
            storage_gb: config.map(|c| c.storage_gb),
        }
    }
}

/// List the caller's servers, newest first, with tier summaries.
pub async fn list_servers(
    State(app): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<DataResponse<Vec<ServerResponse>>>, ApiError> {
    let servers = app.store.list_servers_by_user(&auth.user_id).await?;

    // The catalog is tiny; one listing covers every row's join.
    let configs: HashMap<i64, ServerConfig> = app
        .store
        .list_configs()
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let servers = servers
        .into_iter()
        .map(|server| {
            let config = configs.get(&server.config_id);
            ServerResponse::new(server, config)
        })
        .collect();

    Ok(Json(DataResponse::new(servers)))
}

/// Purchase request.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// Tier to purchase.
    pub config_id: i64,
    /// Display name for the new server.
    pub server_name: String,
    /// Term in months (default: 1).
    #[serde(default = "default_months")]
    pub months: u32,
}

/// Purchase payload.
#[derive(Debug, Serialize)]
pub struct PurchaseData {
    /// The new server.
    pub server: ServerResponse,
    /// Balance after the debit.
    pub new_balance: i64,
}

/// Purchase a server.
///
/// Sequence: validate input, load and check the tier, then let the store
/// debit + create + append the ledger entry in one atomic operation.
pub async fn purchase_server(
    State(app): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<PurchaseRequest>,
) -> Result<Json<DataResponse<PurchaseData>>, ApiError> {
    let name_len = body.server_name.chars().count();
    if name_len < 3 || name_len > 50 {
        return Err(ApiError::validation(
            "server_name",
            "server_name must be between 3 and 50 characters",
        ));
    }
    validate_months(body.months)?;

    let config = app
        .store
        .get_config(body.config_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Server configuration not found".into()))?;

    if !config.is_active {
        return Err(ApiError::InvalidState(
            "This server configuration is not available".into(),
        ));
    }

    let (server, new_balance) = app
        .store
        .purchase_server(&auth.user_id, &config, &body.server_name, body.months)
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        server_id = server.id,
        config = %config.name,
        months = body.months,
        total = config.price_for(body.months),
        new_balance,
        "Server purchased"
    );

    Ok(Json(DataResponse::new(PurchaseData {
        server: ServerResponse::new(server, Some(&config)),
        new_balance,
    })))
}

/// Extension request.
#[derive(Debug, Deserialize)]
pub struct ExtendRequest {
    /// Additional term in months (default: 1).
    #[serde(default = "default_months")]
    pub months: u32,
}

/// Extension payload.
#[derive(Debug, Serialize)]
pub struct ExtendData {
    /// New end of the paid term, RFC 3339.
    pub expires_at: String,
    /// Balance after the debit.
    pub new_balance: i64,
}

/// Extend a server's paid term.
///
/// A server owned by someone else reports the same NotFound as a missing id,
/// so callers cannot probe which ids exist.
pub async fn extend_server(
    State(app): State<Arc<AppState>>,
    auth: AuthUser,
    Path(server_id): Path<i64>,
    Json(body): Json<ExtendRequest>,
) -> Result<Json<DataResponse<ExtendData>>, ApiError> {
    validate_months(body.months)?;

    let server = app
        .store
        .get_server(server_id)
        .await?
        .filter(|server| server.user_id == auth.user_id)
        .ok_or_else(|| ApiError::NotFound("Server not found".into()))?;

    let config = app
        .store
        .get_config(server.config_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Server configuration not found".into()))?;

    let (expires_at, new_balance) = app
        .store
        .extend_server(&auth.user_id, &server, &config, body.months)
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        server_id,
        months = body.months,
        total = config.price_for(body.months),
        new_balance,
        "Server extended"
    );

    Ok(Json(DataResponse::new(ExtendData {
        expires_at: expires_at.to_rfc3339(),
        new_balance,
    })))
}
