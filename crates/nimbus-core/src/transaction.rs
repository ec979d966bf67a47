//! Transaction ledger types.
//!
//! Every balance-affecting event appends a [`Transaction`] row. The ledger is
//! append-only: application logic never mutates or deletes entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::UserId;

/// A recorded balance-affecting event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Database-assigned id.
    pub id: i64,

    /// The user whose balance was affected.
    pub user_id: UserId,

    /// Event category.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// Amount in whole currency units. Positive = credit, negative = debit.
    pub amount: i64,

    /// Human-readable description.
    pub description: String,

    /// Optional link to the affected server row.
    pub reference_id: Option<i64>,

    /// When the event happened.
    pub created_at: DateTime<Utc>,
}

/// Input for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The affected user.
    pub user_id: UserId,
    /// Event category.
    pub kind: TransactionType,
    /// Signed amount.
    pub amount: i64,
    /// Description.
    pub description: String,
    /// Optional server reference.
    pub reference_id: Option<i64>,
}

impl NewTransaction {
    /// A deposit entry crediting `amount`.
    #[must_use]
    pub fn deposit(user_id: UserId, amount: i64) -> Self {
        Self {
            user_id,
            kind: TransactionType::Deposit,
            amount,
            description: "Account deposit".to_string(),
            reference_id: None,
        }
    }

    /// A purchase entry debiting `total`, referencing the new server row.
    #[must_use]
    pub fn purchase(user_id: UserId, total: i64, description: String, server_id: i64) -> Self {
        Self {
            user_id,
            kind: TransactionType::Purchase,
            amount: -total.abs(),
            description,
            reference_id: Some(server_id),
        }
    }

    /// A refund entry crediting `amount` back.
    #[must_use]
    pub fn refund(user_id: UserId, amount: i64, description: String) -> Self {
        Self {
            user_id,
            kind: TransactionType::Refund,
            amount: amount.abs(),
            description,
            reference_id: None,
        }
    }
}

/// Category of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Funds added to the account.
    Deposit,
    /// Funds withdrawn from the account.
    Withdraw,
    /// A server purchase or extension.
    Purchase,
    /// A corrective credit.
    Refund,
}

impl TransactionType {
    /// Stable string form used in the database and on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Purchase => "purchase",
            Self::Refund => "refund",
        }
    }

    /// Whether this category credits the balance.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Deposit | Self::Refund)
    }

    /// Whether this category debits the balance.
    #[must_use]
    pub const fn is_debit(self) -> bool {
        matches!(self, Self::Withdraw | Self::Purchase)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            "purchase" => Ok(Self::Purchase),
            "refund" => Ok(Self::Refund),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

/// Error for an unrecognized transaction type string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction type: {0}")]
pub struct UnknownTransactionType(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        "80351110224678912".parse().unwrap()
    }

    #[test]
    fn purchase_amount_is_always_negative() {
        let tx = NewTransaction::purchase(user(), 200_000, "Cat for 2 months".into(), 7);
        assert_eq!(tx.amount, -200_000);
        assert_eq!(tx.reference_id, Some(7));

        // A caller passing an already-negated total gets the same result.
        let tx = NewTransaction::purchase(user(), -200_000, "Cat for 2 months".into(), 7);
        assert_eq!(tx.amount, -200_000);
    }

    #[test]
    fn deposit_and_refund_are_credits() {
        assert!(TransactionType::Deposit.is_credit());
        assert!(TransactionType::Refund.is_credit());
        assert!(!TransactionType::Purchase.is_credit());

        assert!(TransactionType::Purchase.is_debit());
        assert!(TransactionType::Withdraw.is_debit());
        assert!(!TransactionType::Deposit.is_debit());
    }

    #[test]
    fn type_string_round_trip() {
        for kind in [
            TransactionType::Deposit,
            TransactionType::Withdraw,
            TransactionType::Purchase,
            TransactionType::Refund,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionType>().unwrap(), kind);
        }
        assert!("bonus".parse::<TransactionType>().is_err());
    }
}
