//! Error types for the Ember client.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for Ember operations.
#[derive(Debug, Error)]
pub enum EmberError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be parsed
    #[error("Failed to parse '{path}': {message}")]
    Parse {
        /// Path to the file
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// The config could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Result type alias for Ember operations.
pub type EmberResult<T> = Result<T, EmberError>;
