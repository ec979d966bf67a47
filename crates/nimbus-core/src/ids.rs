//! Identifier types for the account service.
//!
//! User identifiers come from the identity provider and are Discord
//! snowflakes: decimal strings of up to 20 digits. Catalog, server, and
//! transaction rows use database-assigned `i64` ids and need no newtype.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A user identifier (Discord snowflake).
///
/// Snowflakes are 64-bit ids rendered as decimal strings. They are issued by
/// the identity provider and used verbatim as the primary key of the `users`
/// table.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a `UserId` from an already-validated snowflake string.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidSnowflake`] if the string is empty, longer
    /// than 20 characters, or contains a non-digit.
    pub fn new(id: impl Into<String>) -> Result<Self, IdError> {
        let id = id.into();
        if id.is_empty() || id.len() > 20 || !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::InvalidSnowflake);
        }
        Ok(Self(id))
    }

    /// Return the snowflake as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Errors from identifier parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The value is not a valid Discord snowflake.
    #[error("invalid snowflake id")]
    InvalidSnowflake,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_snowflake_parses() {
        let id: UserId = "80351110224678912".parse().unwrap();
        assert_eq!(id.as_str(), "80351110224678912");
        assert_eq!(id.to_string(), "80351110224678912");
    }

    #[test]
    fn rejects_empty_and_non_digit() {
        assert_eq!("".parse::<UserId>(), Err(IdError::InvalidSnowflake));
        assert_eq!("abc123".parse::<UserId>(), Err(IdError::InvalidSnowflake));
        assert_eq!(
            "123456789012345678901".parse::<UserId>(),
            Err(IdError::InvalidSnowflake)
        );
    }

    #[test]
    fn serde_round_trip() {
        let id: UserId = "1234567890".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1234567890\"");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn serde_rejects_invalid() {
        assert!(serde_json::from_str::<UserId>("\"not-a-snowflake\"").is_err());
    }
}
