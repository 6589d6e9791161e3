/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration from
 * environment variables, plus selection of the storage backend.
 *
 * # Configuration Sources
 *
 * | Variable | Default |
 * |---|---|
 * | `SERVER_PORT` | `5000` |
 * | `DATABASE_URL` | unset: in-memory store |
 * | `JWT_SECRET` | development secret, with a warning |
 * | `TOKEN_TTL_SECS` | 30 days |
 * | `BCRYPT_COST` | `bcrypt::DEFAULT_COST` |
 * | `DEFAULT_MEMBER_PASSWORD` | `password123` |
 * | `CORS_ORIGINS` | empty: permissive |
 * | `EVENT_CHANNEL_CAPACITY` | `1000` |
 * | `CHANNEL_CLEANUP_SECS` | `300` |
 *
 * # Error Handling
 *
 * Malformed values are a `ConfigError`. A database that is configured but
 * unreachable is not: the failure is logged and the server continues on the
 * in-memory store.
 */

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::backend::store::{BoardStore, MemoryBoardStore, PgBoardStore};

const DEFAULT_PORT: u16 = 5000;
const DEV_JWT_SECRET: &str = "taskboard-development-secret";
const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;
const DEFAULT_MEMBER_PASSWORD: &str = "password123";
const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
const DEFAULT_CLEANUP_SECS: u64 = 300;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} out of range: {value}")]
    OutOfRange { key: &'static str, value: String },
}

/// Runtime settings of the server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// PostgreSQL URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    /// Password given to teammates added through `POST /api/users`
    pub default_member_password: String,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
    /// Buffer size of each board channel
    pub event_channel_capacity: usize,
    /// How often idle board channels are swept
    pub channel_cleanup_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            default_member_password: DEFAULT_MEMBER_PASSWORD.to_string(),
            cors_origins: Vec::new(),
            event_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            channel_cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_SECS),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset and blank values use defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(port) = get("SERVER_PORT") {
            config.port = parse("SERVER_PORT", &port)?;
        }
        config.database_url = get("DATABASE_URL");
        match get("JWT_SECRET") {
            Some(secret) => config.jwt_secret = secret,
            None => tracing::warn!("JWT_SECRET not set. Using the development secret."),
        }
        if let Some(ttl) = get("TOKEN_TTL_SECS") {
            config.token_ttl = Duration::from_secs(parse("TOKEN_TTL_SECS", &ttl)?);
        }
        if let Some(cost) = get("BCRYPT_COST") {
            let cost: u32 = parse("BCRYPT_COST", &cost)?;
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::OutOfRange {
                    key: "BCRYPT_COST",
                    value: cost.to_string(),
                });
            }
            config.bcrypt_cost = cost;
        }
        if let Some(password) = get("DEFAULT_MEMBER_PASSWORD") {
            config.default_member_password = password;
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }
        if let Some(capacity) = get("EVENT_CHANNEL_CAPACITY") {
            let capacity: usize = parse("EVENT_CHANNEL_CAPACITY", &capacity)?;
            if capacity == 0 {
                return Err(ConfigError::OutOfRange {
                    key: "EVENT_CHANNEL_CAPACITY",
                    value: capacity.to_string(),
                });
            }
            config.event_channel_capacity = capacity;
        }
        if let Some(secs) = get("CHANNEL_CLEANUP_SECS") {
            let secs: u64 = parse("CHANNEL_CLEANUP_SECS", &secs)?;
            config.channel_cleanup_interval = Duration::from_secs(secs.max(1));
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

/// Select and initialize the storage backend
///
/// 1. Without `DATABASE_URL`, use the in-memory store
/// 2. Otherwise connect and run migrations
/// 3. On any failure, log it and fall back to the in-memory store
pub async fn load_store(config: &ServerConfig) -> Arc<dyn BoardStore> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Serving from the in-memory store.");
        return Arc::new(MemoryBoardStore::new());
    };

    tracing::info!("Connecting to database...");
    match PgBoardStore::connect(database_url).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            tracing::warn!("Serving from the in-memory store; data will not persist.");
            Arc::new(MemoryBoardStore::new())
        }
    }
}
