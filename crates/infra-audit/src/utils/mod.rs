//! Utility modules for configuration and error handling.

pub mod config;
pub mod error;

// Re-export commonly used types for convenience
pub use config::{load_config, AuditConfig};
pub use error::{ConfigError, OutputError};
