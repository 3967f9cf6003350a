//! Error types for the fleet tracker

use thiserror::Error;

/// Main error type for the fleet tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Connection or timeout failure on an outbound request
    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Whether the error was raised by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TrackerError::NotFound(_)
                | TrackerError::Validation(_)
                | TrackerError::MethodNotAllowed(_)
        )
    }
}

impl From<anyhow::Error> for TrackerError {
    fn from(err: anyhow::Error) -> Self {
        TrackerError::Internal(err.to_string())
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TrackerError::Decode(err.to_string())
        } else if err.is_timeout() {
            TrackerError::Network(format!("request timed out: {err}"))
        } else {
            TrackerError::Network(err.to_string())
        }
    }
}
