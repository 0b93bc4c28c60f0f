//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind host")]
    InvalidHost,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Chat prefix must be a static path starting with '/'")]
    InvalidChatPrefix,

    #[error("Invalid engine base URL format")]
    InvalidEngineUrl,

    #[error("Engine temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Error marker must not be empty")]
    EmptyErrorMarker,
}
