//! Error types for the Daybook knowledge layer
//!
//! Data conditions (empty input, missing timestamps, malformed LLM output)
//! are never errors at the public boundary: they degrade to rule fallback or
//! to documented zero values. These types cover the places where something
//! can genuinely go wrong: building an HTTP client, loading configuration,
//! and the internals of a single LLM batch before it is converted into a
//! fallback.

use thiserror::Error;

/// Configuration loading and validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main error type for Daybook operations
#[derive(Error, Debug)]
pub enum DaybookError {
    /// LLM endpoint answered with a non-success status or an empty body
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM answered, but the payload failed validation
    #[error("Invalid LLM response: {0}")]
    InvalidLlmResponse(String),

    /// HTTP transport error (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Daybook operations
pub type Result<T> = std::result::Result<T, DaybookError>;
