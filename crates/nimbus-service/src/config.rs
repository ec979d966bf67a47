//! Service configuration.

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:3000").
    pub listen_addr: String,

    /// Path to the `SQLite` database file (default: "./data/nimbus.db").
    pub database_path: String,

    /// Deployment environment name; "production" turns on the Secure cookie
    /// attribute (default: "development").
    pub environment: String,

    /// Discord OAuth application client id (optional; login is disabled
    /// without it).
    pub discord_client_id: Option<String>,

    /// Discord OAuth application client secret (optional).
    pub discord_client_secret: Option<String>,

    /// OAuth redirect URI registered with Discord.
    pub discord_redirect_uri: String,

    /// Discord API base URL. Overridable so tests can point the client at a
    /// local double.
    pub discord_api_base: String,

    /// Discord CDN base URL for avatar links.
    pub discord_cdn_base: String,

    /// Lifetime of a logged-in session in seconds (default: 7 days).
    pub session_max_age_seconds: u64,

    /// Lifetime of the pre-auth session issued before the OAuth redirect
    /// (default: 1 hour).
    pub preauth_max_age_seconds: u64,

    /// Interval between session sweep runs in seconds (default: 1 hour).
    pub session_sweep_interval_seconds: u64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let default_redirect = format!(
            "http://localhost:{}/auth/discord/callback",
            listen_addr.rsplit(':').next().unwrap_or("3000")
        );

        Self {
            listen_addr,
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/nimbus.db".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            discord_client_id: std::env::var("DISCORD_CLIENT_ID").ok(),
            discord_client_secret: std::env::var("DISCORD_CLIENT_SECRET").ok(),
            discord_redirect_uri: std::env::var("DISCORD_REDIRECT_URI")
                .unwrap_or(default_redirect),
            discord_api_base: std::env::var("DISCORD_API_BASE")
                .unwrap_or_else(|_| "https://discord.com/api".into()),
            discord_cdn_base: std::env::var("DISCORD_CDN_BASE")
                .unwrap_or_else(|_| "https://cdn.discordapp.com".into()),
            session_max_age_seconds: env_u64("SESSION_MAX_AGE_SECONDS", 7 * 24 * 60 * 60),
            preauth_max_age_seconds: env_u64("PREAUTH_MAX_AGE_SECONDS", 60 * 60),
            session_sweep_interval_seconds: env_u64("SESSION_SWEEP_INTERVAL_SECONDS", 60 * 60),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024), // 64KB, the API carries no large payloads
            request_timeout_seconds: env_u64("REQUEST_TIMEOUT_SECONDS", 30),
        }
    }

    /// Whether the service runs in production mode.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".into(),
            database_path: "./data/nimbus.db".into(),
            environment: "development".into(),
            discord_client_id: None,
            discord_client_secret: None,
            discord_redirect_uri: "http://localhost:3000/auth/discord/callback".into(),
            discord_api_base: "https://discord.com/api".into(),
            discord_cdn_base: "https://cdn.discordapp.com".into(),
            session_max_age_seconds: 7 * 24 * 60 * 60,
            preauth_max_age_seconds: 60 * 60,
            session_sweep_interval_seconds: 60 * 60,
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
