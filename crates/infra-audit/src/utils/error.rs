//! Error types shared across the library.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in commands and the binary.

use thiserror::Error;

use crate::normalize::NormalizeError;

/// Errors that can occur while reading documents or writing reports
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to read file: {0}")]
    ReadFailed(std::io::Error),

    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid JSON document: {0}")]
    ParseFailed(serde_json::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid masking configuration: {0}")]
    Masking(#[from] NormalizeError),

    #[error("Unknown region context: {0}")]
    UnknownRegionContext(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
