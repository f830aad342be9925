//! Error types for domain synchronization
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the sync system
#[derive(Error, Debug)]
pub enum Error {
    /// Registrar-related errors
    #[error("Registrar error: {0}")]
    Registrar(String),

    /// Domain cache errors
    #[error("Domain store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem and socket errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors (from registrar APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Domain or host not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Registrar-specific error
    #[error("Registrar error ({registrar}): {message}")]
    Provider {
        /// Registrar name
        registrar: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a registrar error
    pub fn registrar(msg: impl Into<String>) -> Self {
        Self::Registrar(msg.into())
    }

    /// Create a domain store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a registrar-specific error
    pub fn provider(registrar: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            registrar: registrar.into(),
            message: message.into(),
        }
    }

    /// Whether the registry reported the object as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether retrying the same request cannot succeed
    ///
    /// Missing objects, bad credentials and malformed input fail the same way
    /// every time, so the engine gives up on them immediately.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Authentication(_) | Self::InvalidInput(_) | Self::Config(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_permanent() {
        let err = Error::not_found("example.com.au");
        assert!(err.is_not_found());
        assert!(err.is_permanent());
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(!Error::rate_limited("slow down").is_permanent());
        assert!(!Error::provider("synergy", "HTTP 503").is_permanent());
        assert!(!Error::http("connection reset").is_permanent());
    }

    #[test]
    fn test_provider_error_display() {
        let err = Error::provider("synergy", "ERR_DOMAININFO_FAILED");
        assert_eq!(
            err.to_string(),
            "Registrar error (synergy): ERR_DOMAININFO_FAILED"
        );
    }
}
