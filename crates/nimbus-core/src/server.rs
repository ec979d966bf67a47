//! Purchased server records and expiry arithmetic.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UserId;

/// A purchased server.
///
/// Created at purchase time with `expires_at = now + N` calendar months and
/// extended by adding further calendar months. Nothing is physically
/// provisioned; the row itself is the product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserServer {
    /// Database-assigned id.
    pub id: i64,

    /// Owning user.
    pub user_id: UserId,

    /// The purchased tier.
    pub config_id: i64,

    /// User-chosen display name.
    pub server_name: String,

    /// Lifecycle status.
    pub status: ServerStatus,

    /// When the paid term ends.
    pub expires_at: DateTime<Utc>,

    /// When the server was purchased.
    pub created_at: DateTime<Utc>,

    /// When the record last changed.
    pub updated_at: DateTime<Utc>,
}

impl UserServer {
    /// Whether the paid term has lapsed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Lifecycle status of a purchased server.
///
/// Transitions between these are administrative; the purchase flow only ever
/// creates servers in the `Active` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    /// Paid for and nominally running.
    Active,
    /// Temporarily disabled.
    Suspended,
    /// Permanently ended.
    Terminated,
}

impl ServerStatus {
    /// Stable string form used in the database and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "terminated" => Ok(Self::Terminated),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Error for an unrecognized status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown server status: {0}")]
pub struct UnknownStatus(pub String);

/// Add `months` calendar months to a timestamp, clamping to the last day of
/// the target month (Jan 31 + 1 month = Feb 28/29).
///
/// Calendar arithmetic cannot overflow for any term length the service
/// accepts, so the saturating fallback is unreachable in practice.
#[must_use]
pub fn add_months(at: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    at.checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_string_round_trip() {
        for status in [
            ServerStatus::Active,
            ServerStatus::Suspended,
            ServerStatus::Terminated,
        ] {
            assert_eq!(status.as_str().parse::<ServerStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<ServerStatus>().is_err());
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let jan31 = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let feb29 = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
        assert_eq!(add_months(jan31, 1), feb29);

        // Non-leap year clamps to the 28th.
        let jan31 = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        let feb28 = Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap();
        assert_eq!(add_months(jan31, 1), feb28);
    }

    #[test]
    fn add_months_plain_case() {
        let mar15 = Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap();
        let jun15 = Utc.with_ymd_and_hms(2024, 6, 15, 8, 30, 0).unwrap();
        assert_eq!(add_months(mar15, 3), jun15);
    }

    #[test]
    fn expiry_check_is_strict() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let server = UserServer {
            id: 1,
            user_id: "1234567890".parse().unwrap(),
            config_id: 1,
            server_name: "web-01".into(),
            status: ServerStatus::Active,
            expires_at: now,
            created_at: now,
            updated_at: now,
        };
        assert!(!server.is_expired(now));
        assert!(server.is_expired(now + chrono::Duration::seconds(1)));
    }
}
