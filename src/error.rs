use thiserror::Error;

/// Error types for the latexify library.
///
/// Each variant represents a distinct failure class, so callers can tell a
/// missing credential apart from a transport failure or a rejected request.
///
/// # Examples
///
/// ```
/// use latexify::{LatexifyError, Result};
///
/// fn check_key(key: &str) -> Result<()> {
///     if key.is_empty() {
///         return Err(LatexifyError::ConfigError("API key cannot be empty".into()));
///     }
///     Ok(())
/// }
///
/// match check_key("") {
///     Ok(()) => println!("key looks fine"),
///     Err(LatexifyError::ConfigError(msg)) => println!("bad configuration: {}", msg),
///     Err(e) => println!("unexpected error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum LatexifyError {
    /// Missing or invalid configuration (e.g. absent API key, empty input)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error reading an image file from disk
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The remote API rejected the request (non-success HTTP status)
    #[error("API error: {0}")]
    ApiError(String),

    /// The remote API answered successfully but the payload was not usable
    /// (no choices, missing message content)
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Operation timed out
    #[error("Timeout error")]
    Timeout,

    /// HTTP client error (from reqwest)
    #[cfg(feature = "grok")]
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error (from serde_json)
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// Manual implementation of PartialEq for LatexifyError.
// Wrapped foreign errors (io, reqwest, serde_json) don't implement PartialEq,
// so those variants always compare unequal.
impl PartialEq for LatexifyError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ConfigError(a), Self::ConfigError(b)) => a == b,
            (Self::ApiError(a), Self::ApiError(b)) => a == b,
            (Self::UnexpectedResponse(a), Self::UnexpectedResponse(b)) => a == b,
            (Self::Timeout, Self::Timeout) => true,
            _ => false,
        }
    }
}

/// A specialized Result type for latexify operations.
pub type Result<T> = std::result::Result<T, LatexifyError>;
