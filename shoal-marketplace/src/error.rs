//! Marketplace client error types

use thiserror::Error;

/// Marketplace client error type
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API-level error signalled by the response payload or status
    #[error("Marketplace API error [{code}]: {message}")]
    Api { code: String, message: String },

    /// Invalid or expired token/signature
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Requested order-list window exceeds the upstream maximum
    #[error("Time window of {days} days exceeds the {max}-day API maximum")]
    WindowTooWide { days: i64, max: i64 },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Response carried a content type the caller cannot use
    #[error("Unexpected content type: {0}")]
    UnexpectedContentType(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MarketplaceError {
    /// The upstream error code, when the error carries one
    pub fn upstream_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type for marketplace client operations
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;
