//! Discord API wire types.

use serde::Deserialize;

/// Response from the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token for API requests on behalf of the user.
    pub access_token: String,
    /// Token type, always "Bearer".
    pub token_type: String,
    /// Seconds until the access token expires.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Token for refreshing the access token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

/// The `users/@me` profile.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    /// Snowflake id.
    pub id: String,
    /// Username.
    pub username: String,
    /// Legacy four-digit discriminator; "0" for migrated accounts.
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Avatar hash, absent when the user never set one.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Email, present only with the `email` scope and a verified address.
    #[serde(default)]
    pub email: Option<String>,
}
