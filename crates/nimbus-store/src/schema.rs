//! Database schema and seed catalog.
//!
//! The schema is applied idempotently at startup; there is no separate
//! migration history. Timestamps are written by the application as RFC 3339
//! text, never by SQL defaults, so every stored value decodes the same way.

/// DDL statements, executed in order at startup.
pub const TABLES: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        email TEXT,
        avatar_url TEXT,
        balance INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS server_configs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        cpu_cores INTEGER NOT NULL,
        ram_gb REAL NOT NULL,
        storage_gb INTEGER NOT NULL,
        storage_type TEXT NOT NULL DEFAULT 'NVMe SSD',
        bandwidth_gb INTEGER NOT NULL DEFAULT 0,
        price_monthly INTEGER NOT NULL,
        max_websites INTEGER NOT NULL DEFAULT 1,
        features TEXT NOT NULL DEFAULT '[]',
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS user_servers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        config_id INTEGER NOT NULL,
        server_name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active',
        expires_at TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
        FOREIGN KEY (config_id) REFERENCES server_configs(id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS transactions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        type TEXT NOT NULL,
        amount INTEGER NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        reference_id INTEGER,
        created_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
    )
    ",
];

/// Index statements, executed after the tables exist.
pub const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_users_username ON users(username)",
    "CREATE INDEX IF NOT EXISTS idx_user_servers_user_id ON user_servers(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_user_servers_status ON user_servers(status)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_user_id ON transactions(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_type ON transactions(type)",
];

/// A seed catalog tier.
pub struct SeedConfig {
    /// Unique tier name.
    pub name: &'static str,
    /// CPU cores.
    pub cpu_cores: i64,
    /// RAM in gigabytes.
    pub ram_gb: f64,
    /// Storage in gigabytes.
    pub storage_gb: i64,
    /// Storage medium.
    pub storage_type: &'static str,
    /// Bandwidth in gigabytes, 0 = unlimited.
    pub bandwidth_gb: i64,
    /// Monthly price in whole currency units.
    pub price_monthly: i64,
    /// Website allowance, 0 = unlimited.
    pub max_websites: i64,
    /// Marketing feature list.
    pub features: &'static [&'static str],
}

/// Default catalog, inserted with `INSERT OR IGNORE` so administrative edits
/// survive restarts.
pub const SEED_CONFIGS: &[SeedConfig] = &[
    SeedConfig {
        name: "Kitten",
        cpu_cores: 1,
        ram_gb: 1.0,
        storage_gb: 2,
        storage_type: "NVMe SSD Gen 3",
        bandwidth_gb: 50,
        price_monthly: 50_000,
        max_websites: 1,
        features: &["Free SSL", "Weekly backups"],
    },
    SeedConfig {
        name: "Cat",
        cpu_cores: 2,
        ram_gb: 2.0,
        storage_gb: 10,
        storage_type: "NVMe SSD Gen 3",
        bandwidth_gb: 200,
        price_monthly: 100_000,
        max_websites: 5,
        features: &["Free SSL", "Daily backups", "Email hosting"],
    },
    SeedConfig {
        name: "Lion",
        cpu_cores: 4,
        ram_gb: 4.0,
        storage_gb: 50,
        storage_type: "NVMe SSD Gen 3",
        bandwidth_gb: 0,
        price_monthly: 200_000,
        max_websites: 0,
        features: &[
            "Free SSL",
            "Daily backups",
            "Email hosting",
            "Priority support",
            "Free CDN",
        ],
    },
];
