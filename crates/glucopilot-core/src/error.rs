//! Error types for Glucopilot

use thiserror::Error;

/// Result type alias for Glucopilot operations
pub type CopilotResult<T> = Result<T, CopilotError>;

/// Main error type for Glucopilot
#[derive(Error, Debug, Clone)]
pub enum CopilotError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A time window whose start is not before its end
    #[error("Invalid range: since={since} must be before until={until}")]
    InvalidRange { since: i64, until: i64 },

    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Daily insight provider errors
    #[error("Insight error: {0}")]
    Insight(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl CopilotError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new invalid range error
    pub const fn invalid_range(since: i64, until: i64) -> Self {
        Self::InvalidRange { since, until }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a new insight error
    pub fn insight(message: impl Into<String>) -> Self {
        Self::Insight(message.into())
    }

    /// Create a new generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<anyhow::Error> for CopilotError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}

impl From<std::io::Error> for CopilotError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for CopilotError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for CopilotError {
    fn from(error: reqwest::Error) -> Self {
        Self::Insight(error.to_string())
    }
}
