use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    /// Present when the MySQL backend is selected
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub storage_backend: StorageBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

/// Where repositories keep their data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Mysql,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StorageBackend::Mysql),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

/// Context values used when a request does not carry its own headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DefaultsConfig {
    pub user_id: i64,
    pub company_id: i64,
    pub currency_id: i64,
}

/// Read `name` and parse it, using `default` when unset
pub(crate) fn env_or<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let storage_backend: StorageBackend = env_or("STORAGE_BACKEND", "mysql")?;

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env_or("LOG_FORMAT", "pretty")?,
                storage_backend,
            },
            database: match storage_backend {
                StorageBackend::Mysql => Some(DatabaseConfig::from_env()?),
                StorageBackend::Memory => None,
            },
            server: ServerConfig::from_env()?,
            defaults: DefaultsConfig {
                user_id: env_or("DEFAULT_USER_ID", "1")?,
                company_id: env_or("DEFAULT_COMPANY_ID", "1")?,
                currency_id: env_or("DEFAULT_CURRENCY_ID", "1")?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.app.storage_backend == StorageBackend::Mysql && self.database.is_none() {
            return Err(AppError::Configuration(
                "MySQL storage selected without database configuration".to_string(),
            ));
        }

        if let Some(database) = &self.database {
            database.validate()?;
        }

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "Server workers must be greater than 0".to_string(),
            ));
        }

        let defaults = &self.defaults;
        if defaults.user_id <= 0 || defaults.company_id <= 0 || defaults.currency_id <= 0 {
            return Err(AppError::Configuration(
                "Default user, company and currency ids must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
