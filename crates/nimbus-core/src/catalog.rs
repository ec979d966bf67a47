//! Purchasable server tier definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchasable hosting tier.
///
/// Tiers are read-mostly: they are seeded at first run and only change
/// through administrative edits. A tier referenced by an existing purchase is
/// never deleted implicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Database-assigned id.
    pub id: i64,

    /// Unique tier name (e.g. "Cat").
    pub name: String,

    /// Number of CPU cores.
    pub cpu_cores: i64,

    /// RAM in gigabytes. Fractional tiers exist (0.5 GB entry plans).
    pub ram_gb: f64,

    /// Storage in gigabytes.
    pub storage_gb: i64,

    /// Storage medium description (e.g. "NVMe SSD Gen 3").
    pub storage_type: String,

    /// Monthly bandwidth in gigabytes. `0` means unlimited.
    pub bandwidth_gb: i64,

    /// Price per month in whole currency units.
    pub price_monthly: i64,

    /// Maximum hosted websites. `0` means unlimited.
    pub max_websites: i64,

    /// Ordered marketing feature list.
    pub features: Vec<String>,

    /// Whether the tier can currently be purchased.
    pub is_active: bool,

    /// When the tier was created.
    pub created_at: DateTime<Utc>,

    /// When the tier was last edited.
    pub updated_at: DateTime<Utc>,
}

impl ServerConfig {
    /// Total price for a term of `months` months.
    #[must_use]
    pub fn price_for(&self, months: u32) -> i64 {
        self.price_monthly * i64::from(months)
    }

    /// Whether the bandwidth allowance is unlimited.
    #[must_use]
    pub fn unlimited_bandwidth(&self) -> bool {
        self.bandwidth_gb == 0
    }

    /// Whether the website allowance is unlimited.
    #[must_use]
    pub fn unlimited_websites(&self) -> bool {
        self.max_websites == 0
    }
}

/// Input for creating a tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServerConfig {
    /// Unique tier name.
    pub name: String,
    /// Number of CPU cores.
    pub cpu_cores: i64,
    /// RAM in gigabytes.
    pub ram_gb: f64,
    /// Storage in gigabytes.
    pub storage_gb: i64,
    /// Storage medium description.
    pub storage_type: String,
    /// Monthly bandwidth in gigabytes, `0` for unlimited.
    pub bandwidth_gb: i64,
    /// Price per month in whole currency units.
    pub price_monthly: i64,
    /// Maximum hosted websites, `0` for unlimited.
    pub max_websites: i64,
    /// Ordered feature list.
    pub features: Vec<String>,
}

/// Partial update for an administrative tier edit.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfigUpdate {
    /// New tier name.
    pub name: Option<String>,
    /// New core count.
    pub cpu_cores: Option<i64>,
    /// New RAM size.
    pub ram_gb: Option<f64>,
    /// New storage size.
    pub storage_gb: Option<i64>,
    /// New storage medium.
    pub storage_type: Option<String>,
    /// New bandwidth allowance.
    pub bandwidth_gb: Option<i64>,
    /// New monthly price.
    pub price_monthly: Option<i64>,
    /// New website allowance.
    pub max_websites: Option<i64>,
    /// New feature list.
    pub features: Option<Vec<String>>,
}

impl ServerConfigUpdate {
    /// Whether the update carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.cpu_cores.is_none()
            && self.ram_gb.is_none()
            && self.storage_gb.is_none()
            && self.storage_type.is_none()
            && self.bandwidth_gb.is_none()
            && self.price_monthly.is_none()
            && self.max_websites.is_none()
            && self.features.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(price_monthly: i64, bandwidth_gb: i64, max_websites: i64) -> ServerConfig {
        let now = Utc::now();
        ServerConfig {
            id: 1,
            name: "Cat".into(),
            cpu_cores: 2,
            ram_gb: 2.0,
            storage_gb: 10,
            storage_type: "NVMe SSD Gen 3".into(),
            bandwidth_gb,
            price_monthly,
            max_websites,
            features: vec!["Free SSL".into()],
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn price_scales_with_months() {
        let config = tier(100_000, 200, 5);
        assert_eq!(config.price_for(1), 100_000);
        assert_eq!(config.price_for(2), 200_000);
        assert_eq!(config.price_for(24), 2_400_000);
    }

    #[test]
    fn zero_means_unlimited() {
        let config = tier(200_000, 0, 0);
        assert!(config.unlimited_bandwidth());
        assert!(config.unlimited_websites());

        let config = tier(50_000, 50, 1);
        assert!(!config.unlimited_bandwidth());
        assert!(!config.unlimited_websites());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(ServerConfigUpdate::default().is_empty());
        let update = ServerConfigUpdate {
            price_monthly: Some(75_000),
            ..ServerConfigUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
