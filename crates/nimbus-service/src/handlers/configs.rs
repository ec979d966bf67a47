//! Server tier catalog handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use nimbus_core::ServerConfig;

use crate::error::ApiError;
use crate::handlers::DataResponse;
use crate::state::AppState;

/// A tier as exposed to the pricing page.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    /// Tier id.
    pub id: i64,
    /// Tier name.
    pub name: String,
    /// CPU cores.
    pub cpu_cores: i64,
    /// RAM in gigabytes.
    pub ram_gb: f64,
    /// Storage in gigabytes.
    pub storage_gb: i64,
    /// Storage medium.
    pub storage_type: String,
    /// Bandwidth in gigabytes, 0 = unlimited.
    pub bandwidth_gb: i64,
    /// Monthly price.
    pub price_monthly: i64,
    /// Website allowance, 0 = unlimited.
    pub max_websites: i64,
    /// Marketing feature list.
    pub features: Vec<String>,
    /// Whether the tier is purchasable.
    pub is_active: bool,
}

impl From<ServerConfig> for ConfigResponse {
    fn from(config: ServerConfig) -> Self {
        Self {
            id: config.id,
            name: config.name,
            cpu_cores: config.cpu_cores,
            ram_gb: config.ram_gb,
            storage_gb: config.storage_gb,
            storage_type: config.storage_type,
            bandwidth_gb: config.bandwidth_gb,
            price_monthly: config.price_monthly,
            max_websites: config.max_websites,
            features: config.features,
            is_active: config.is_active,
        }
    }
}

/// List the purchasable tiers, cheapest first.
pub async fn list_configs(
    State(app): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<ConfigResponse>>>, ApiError> {
    let configs = app.store.list_active_configs().await?;
    let configs = configs.into_iter().map(ConfigResponse::from).collect();
    Ok(Json(DataResponse::new(configs)))
}

/// Get a single tier by id.
pub async fn get_config(
    State(app): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DataResponse<ConfigResponse>>, ApiError> {
    let config = app
        .store
        .get_config(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Server configuration not found".into()))?;

    Ok(Json(DataResponse::new(config.into())))
}
