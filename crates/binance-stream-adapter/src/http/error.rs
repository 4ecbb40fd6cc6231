/*
[INPUT]:  Error sources (HTTP transport, exchange error bodies, serialization, config)
[OUTPUT]: Structured error types with retry hints
[POS]:    HTTP layer - error types for REST calls and configuration loading
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for REST calls and configuration
#[derive(Error, Debug)]
pub enum BinanceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Exchange returned an error body (`{"code": .., "msg": ..}`) or a bare error status
    #[error("API error (code {code}): {message}")]
    Api { code: i64, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Request needs an API key or secret that was never set
    #[error("Missing credentials for {endpoint}")]
    MissingCredentials { endpoint: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded (HTTP 429) or IP banned (HTTP 418)
    #[error("Rate limit exceeded (status {status}), retry after {retry_after}s")]
    RateLimit { status: u16, retry_after: u64 },
}

impl BinanceError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            BinanceError::Http(err) => err.is_timeout() || err.is_connect(),
            BinanceError::RateLimit { .. } | BinanceError::InvalidResponse(_) => true,
            // -1001 disconnected, -1007 backend timeout
            BinanceError::Api { code, .. } => matches!(code, -1001 | -1007),
            _ => false,
        }
    }

    /// Get retry delay in seconds (if retryable)
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            BinanceError::RateLimit { retry_after, .. } => Some(*retry_after),
            BinanceError::Api { .. } if self.is_retryable() => Some(1),
            _ => None,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        BinanceError::Api {
            code: i64::from(status.as_u16()),
            message: message.into(),
        }
    }
}

/// Result type alias for REST operations
pub type Result<T> = std::result::Result<T, BinanceError>;
