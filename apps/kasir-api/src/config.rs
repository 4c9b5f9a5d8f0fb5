//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | variable                   | default    |
//! |----------------------------|------------|
//! | `KASIR_HOST`               | `0.0.0.0`  |
//! | `KASIR_PORT` / `PORT`      | `8080`     |
//! | `KASIR_STORAGE`            | `sqlite`   |
//! | `KASIR_DATABASE_PATH`      | `kasir.db` |
//! | `KASIR_DB_MAX_CONNECTIONS` | `5`        |
//! | `KASIR_CURRENCY`           | `IDR`      |
//! | `KASIR_CURRENCY_SCALE`     | `0`        |
//! | `KASIR_ACTOR`              | `USER`     |
//! | `KASIR_LOG_LEVEL`          | `info`     |

use std::env;
use std::fmt;
use std::str::FromStr;

use kasir_core::money::{DEFAULT_CURRENCY, DEFAULT_SCALE};
use kasir_core::{Currency, DEFAULT_ACTOR};

/// Which repository backend the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" | "inmemory" | "in-memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::InvalidValue("KASIR_STORAGE".to_string())),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "sqlite"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Repository backend
    pub storage: StorageBackend,

    /// SQLite database file (`:memory:` allowed)
    pub database_path: String,

    /// SQLite pool size
    pub db_max_connections: u32,

    /// Currency code every price is expressed in
    pub currency_code: String,

    /// Minor-unit scale of `currency_code`
    pub currency_scale: u32,

    /// Actor written to audit fields
    pub actor: String,

    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            storage: StorageBackend::Sqlite,
            database_path: "kasir.db".to_string(),
            db_max_connections: 5,
            currency_code: DEFAULT_CURRENCY.to_string(),
            currency_scale: DEFAULT_SCALE,
            actor: DEFAULT_ACTOR.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = AppConfig {
            host: var("KASIR_HOST").unwrap_or(defaults.host),

            port: match var("KASIR_PORT").or_else(|| var("PORT")) {
                Some(raw) => parse("KASIR_PORT", &raw)?,
                None => defaults.port,
            },

            storage: match var("KASIR_STORAGE") {
                Some(raw) => raw.parse()?,
                None => defaults.storage,
            },

            database_path: var("KASIR_DATABASE_PATH").unwrap_or(defaults.database_path),

            db_max_connections: match var("KASIR_DB_MAX_CONNECTIONS") {
                Some(raw) => parse("KASIR_DB_MAX_CONNECTIONS", &raw)?,
                None => defaults.db_max_connections,
            },

            currency_code: var("KASIR_CURRENCY")
                .map(|c| c.trim().to_ascii_uppercase())
                .unwrap_or(defaults.currency_code),

            currency_scale: match var("KASIR_CURRENCY_SCALE") {
                Some(raw) => parse("KASIR_CURRENCY_SCALE", &raw)?,
                None => defaults.currency_scale,
            },

            actor: var("KASIR_ACTOR").unwrap_or(defaults.actor),

            log_level: var("KASIR_LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("KASIR_DB_MAX_CONNECTIONS".to_string()));
        }

        // 10^scale must fit comfortably in an i64 amount
        if config.currency_scale > 9 {
            return Err(ConfigError::InvalidValue("KASIR_CURRENCY_SCALE".to_string()));
        }

        Ok(config)
    }

    /// The configured currency.
    pub fn currency(&self) -> Currency {
        Currency::new(self.currency_code.clone(), self.currency_scale)
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
