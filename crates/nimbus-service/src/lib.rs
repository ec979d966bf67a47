//! Nimbus Hosting HTTP API service.
//!
//! This crate provides the HTTP API for the Nimbus Hosting account system,
//! including:
//!
//! - Discord OAuth login and the session cookie lifecycle
//! - The server tier catalog
//! - Balance, deposits, and the transaction ledger
//! - Server purchase and extension
//!
//! # Authentication
//!
//! Identity is carried by a single session cookie. The cookie value is an
//! opaque token looked up in an in-memory [`session::SessionStore`]; a
//! process restart therefore logs everyone out, which is an accepted
//! limitation of the design.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod discord;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServiceConfig;
pub use discord::{DiscordClient, DiscordError};
pub use error::ApiError;
pub use routes::create_router;
pub use session::{Session, SessionData, SessionStore};
pub use state::AppState;
