//! services/api/src/error.rs
//!
//! Defines the primary error type for starting and running the API service.
//! Request-level failures are rendered by `web::protocol::HttpError`.

use crate::config::ConfigError;
use crate::seed::SeedError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure applying the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a failure loading the seed file.
    #[error("Seed Error: {0}")]
    Seed(#[from] SeedError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
