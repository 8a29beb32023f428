//! Error types and handling for datagen core

use thiserror::Error;

/// Result type alias for datagen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for datagen core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// LLM client errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Config source (AI config / feature flag service) errors
    #[error("Config source error: {0}")]
    ConfigSource(#[from] ConfigSourceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Prompt template errors
    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Unsupported provider: {provider}")]
    UnsupportedProvider { provider: String },
}

/// LLM client errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {message}")]
    Network { message: String },
}

/// Config source errors
#[derive(Error, Debug)]
pub enum ConfigSourceError {
    #[error("Initialization timed out after {timeout:?}")]
    InitializationTimeout { timeout: std::time::Duration },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Unexpected response: {status} - {message}")]
    UnexpectedResponse { status: u16, message: String },

    #[error("Client not initialized")]
    NotInitialized,

    #[error("Failed to deliver events: {message}")]
    EventDelivery { message: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
