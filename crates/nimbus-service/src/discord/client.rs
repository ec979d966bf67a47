//! Discord OAuth client implementation.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use super::types::{DiscordUser, TokenResponse};

/// Number of default embed avatars Discord serves.
const DEFAULT_AVATAR_COUNT: u32 = 5;

/// Error type for Discord operations.
#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint rejected the authorization code.
    #[error("code exchange failed: {status}: {body}")]
    Exchange {
        /// HTTP status returned by Discord.
        status: StatusCode,
        /// Response body, for the log.
        body: String,
    },

    /// The profile endpoint rejected the access token.
    #[error("profile fetch failed: {status}: {body}")]
    Profile {
        /// HTTP status returned by Discord.
        status: StatusCode,
        /// Response body, for the log.
        body: String,
    },

    /// Configuration error (bad base URL).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Discord OAuth client.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_endpoint: Url,
    token_endpoint: Url,
    profile_endpoint: Url,
    cdn_base: String,
}

impl DiscordClient {
    /// Create a new Discord client.
    ///
    /// `api_base` and `cdn_base` default to the public Discord endpoints in
    /// configuration and are overridable so tests can substitute a local
    /// double.
    ///
    /// # Errors
    ///
    /// Returns `DiscordError::Configuration` if a base URL does not parse and
    /// `DiscordError::Http` if the HTTP client cannot be built.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        api_base: &str,
        cdn_base: impl Into<String>,
    ) -> Result<Self, DiscordError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let api_base = api_base.trim_end_matches('/');
        let parse = |suffix: &str| {
            Url::parse(&format!("{api_base}/{suffix}"))
                .map_err(|e| DiscordError::Configuration(format!("API base URL: {e}")))
        };

        Ok(Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorize_endpoint: parse("oauth2/authorize")?,
            token_endpoint: parse("oauth2/token")?,
            profile_endpoint: parse("users/@me")?,
            cdn_base: cdn_base.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build the authorization redirect URL carrying the anti-forgery state.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "identify email")
            .append_pair("state", state);
        url.into()
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, DiscordError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(self.token_endpoint.clone())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DiscordError::Exchange { status, body });
        }

        Ok(response.json().await?)
    }

    /// Fetch the logged-in user's profile.
    pub async fn fetch_user(&self, access_token: &str) -> Result<DiscordUser, DiscordError> {
        let response = self
            .client
            .get(self.profile_endpoint.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DiscordError::Profile { status, body });
        }

        Ok(response.json().await?)
    }

    /// Resolve the avatar URL for a profile.
    ///
    /// With an avatar hash this is the user's CDN avatar; without one,
    /// Discord's default embed avatar selected by `discriminator mod 5`.
    #[must_use]
    pub fn avatar_url(&self, user: &DiscordUser) -> String {
        match &user.avatar {
            Some(hash) => format!("{}/avatars/{}/{hash}.png", self.cdn_base, user.id),
            None => {
                let discriminator: u32 = user
                    .discriminator
                    .as_deref()
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(0);
                format!(
                    "{}/embed/avatars/{}.png",
                    self.cdn_base,
                    discriminator % DEFAULT_AVATAR_COUNT
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> DiscordClient {
        DiscordClient::new(
            "1234",
            "secret",
            "http://localhost:3000/auth/discord/callback",
            "https://discord.com/api",
            "https://cdn.discordapp.com",
        )
        .unwrap()
    }

    fn user(avatar: Option<&str>, discriminator: Option<&str>) -> DiscordUser {
        DiscordUser {
            id: "80351110224678912".into(),
            username: "mascot".into(),
            discriminator: discriminator.map(Into::into),
            avatar: avatar.map(Into::into),
            email: None,
        }
    }

    #[test]
    fn authorize_url_carries_state_and_scopes() {
        let url = client().authorize_url("abc123");
        assert!(url.starts_with("https://discord.com/api/oauth2/authorize?"));
        assert!(url.contains("client_id=1234"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=identify+email"));
        assert!(url.contains("state=abc123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fdiscord%2Fcallback"));
    }

    #[test]
    fn avatar_url_prefers_uploaded_hash() {
        let url = client().avatar_url(&user(Some("a1b2c3"), Some("1337")));
        assert_eq!(
            url,
            "https://cdn.discordapp.com/avatars/80351110224678912/a1b2c3.png"
        );
    }

    #[test]
    fn avatar_url_falls_back_to_default_by_discriminator() {
        let url = client().avatar_url(&user(None, Some("1337")));
        assert_eq!(url, "https://cdn.discordapp.com/embed/avatars/2.png"); // 1337 % 5

        // Migrated accounts report discriminator "0".
        let url = client().avatar_url(&user(None, Some("0")));
        assert_eq!(url, "https://cdn.discordapp.com/embed/avatars/0.png");

        // Missing discriminator degrades to the first default.
        let url = client().avatar_url(&user(None, None));
        assert_eq!(url, "https://cdn.discordapp.com/embed/avatars/0.png");
    }
}
