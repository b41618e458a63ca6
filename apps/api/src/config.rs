//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file, if present, is read first by `main`.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use shopfloor_core::credentials::MAX_TOKEN_TTL_SECS;
use shopfloor_core::AuthConfig;
use shopfloor_db::DbConfig;

/// Signing key used when `JWT_SECRET` is unset. Fine for a laptop, never
/// for a deployment.
pub const DEV_JWT_SECRET: &str = "shopfloor-dev-secret-change-in-production";

/// API configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Listen address
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Upper bound on waiting for the SQLite write lock
    pub db_lock_timeout_ms: u64,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig {
            bind_addr: parse_or(&lookup, "BIND_ADDR", "0.0.0.0:8000")?,

            database_path: PathBuf::from(
                lookup("DATABASE_PATH").unwrap_or_else(|| "./shopfloor.db".to_string()),
            ),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", "5")?,

            db_lock_timeout_ms: parse_or(&lookup, "DB_LOCK_TIMEOUT_MS", "5000")?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            jwt_access_lifetime_secs: parse_or(&lookup, "JWT_ACCESS_LIFETIME_SECS", "1800")?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.db_lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("DB_LOCK_TIMEOUT_MS".to_string()));
        }
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&config.jwt_access_lifetime_secs) {
            return Err(ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()));
        }
        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::InvalidValue("JWT_SECRET".to_string()));
        }

        Ok(config)
    }

    /// True when no `JWT_SECRET` was supplied.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Database pool settings.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .lock_timeout(Duration::from_millis(self.db_lock_timeout_ms))
    }

    /// Token signing settings.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.jwt_secret.clone()).access_token_ttl_secs(self.jwt_access_lifetime_secs)
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_lock_timeout_ms", &self.db_lock_timeout_ms)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_access_lifetime_secs", &self.jwt_access_lifetime_secs)
            .finish()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
