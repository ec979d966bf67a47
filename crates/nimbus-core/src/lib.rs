//! Core types for the Nimbus Hosting account service.
//!
//! This crate provides the foundational types used throughout the platform:
//!
//! - **Identifiers**: [`UserId`]
//! - **Users**: [`User`], [`UserProfile`]
//! - **Catalog**: [`ServerConfig`], [`NewServerConfig`]
//! - **Servers**: [`UserServer`], [`ServerStatus`]
//! - **Ledger**: [`Transaction`], [`TransactionType`]
//!
//! # Currency
//!
//! Balances and prices are whole currency units stored as `i64` — there is no
//! minor unit, so no floating point is involved anywhere in billing math.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod ids;
pub mod server;
pub mod transaction;
pub mod user;

pub use catalog::{NewServerConfig, ServerConfig, ServerConfigUpdate};
pub use ids::{IdError, UserId};
pub use server::{add_months, ServerStatus, UserServer};
pub use transaction::{NewTransaction, Transaction, TransactionType};
pub use user::{User, UserProfile};
