//! Error types for apidiff-core.
//!
//! Parsing, diffing and impact analysis are total and never fail. Errors
//! only come from loading configuration and from JSON import/export.

use thiserror::Error;

/// Result type alias for apidiff-core operations.
pub type Result<T> = std::result::Result<T, ApiDiffError>;

/// Errors that can occur outside the pure analysis functions.
#[derive(Error, Debug)]
pub enum ApiDiffError {
    /// IO error reading a configuration file.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file is not valid TOML or has wrong field types.
    #[error("Invalid configuration: {0}")]
    ConfigError(#[from] toml::de::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
