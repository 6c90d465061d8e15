//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub seed_path: Option<PathBuf>,
    pub reset_database: bool,
    pub token_ttl_days: i64,
    /// `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server ---
        let bind_address_str = match lookup("BIND_ADDRESS") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", lookup("PORT").unwrap_or_else(|| "8080".to_string())),
        };
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = lookup("CORS_ORIGIN").filter(|o| !o.is_empty());

        // --- Storage ---
        let database_url = lookup("DATABASE_URL").filter(|u| !u.is_empty());
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;
        if database_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let seed_path = lookup("SEED_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        let reset_database = parse_flag(&lookup, "RESET_DATABASE")?;

        // --- Auth ---
        let token_ttl_days = parse_or(&lookup, "TOKEN_TTL_DAYS", 30i64)?;
        if token_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "TOKEN_TTL_DAYS".to_string(),
                "must be a positive number of days".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_url,
            database_max_connections,
            log_level,
            seed_path,
            reset_database,
            token_ttl_days,
            cors_origin,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") | Some("true") | Some("TRUE") | Some("yes") => Ok(true),
        Some("0") | Some("false") | Some("FALSE") | Some("no") => Ok(false),
        Some(other) => Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("'{}' is not a boolean", other),
        )),
    }
}
