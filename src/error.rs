use thiserror::Error;

/// Custom error types for the timezone-updater application
#[derive(Error, Debug)]
pub enum AppError {
    /// Error when the timezone service answers with an unsuccessful status
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Error when a configuration value cannot be interpreted
    #[error("Invalid configuration for {name}: {value}")]
    InvalidConfig { name: String, value: String },

    /// Wrapper for reqwest errors
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Wrapper for JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
