//! Warehouse client error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Warehouse client error type
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed even after a token refresh
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limit reached; retry after the carried reset time
    #[error("Rate limited{}", reset_display(.reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// The order is already registered server-side
    #[error("Order already registered: {0}")]
    Duplicate(String),

    /// Structural validation failure for one payload
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Any other API failure
    #[error("Warehouse API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

fn reset_display(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(at) => format!(", resets at {}", at.to_rfc3339()),
        None => String::new(),
    }
}

/// Result type for warehouse client operations
pub type WarehouseResult<T> = Result<T, WarehouseError>;
