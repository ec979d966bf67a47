//! Discord OAuth integration.
//!
//! Discord is treated as an opaque identity provider: the service exchanges
//! an authorization code for tokens, fetches the profile, and derives an
//! avatar URL. Nothing else of the Discord API is used.

pub mod client;
pub mod types;

pub use client::{DiscordClient, DiscordError};
pub use types::{DiscordUser, TokenResponse};
