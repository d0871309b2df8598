//! Error types for labsite-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type for labsite-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for labsite-core
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config not found. Searched: {searched:?}")]
    ConfigNotFound { searched: Vec<PathBuf> },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Client input was missing or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Hashing or signing library fault.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
