//! Error types

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// This is the top-level error type carried through run reporting and
/// notifications, providing:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details for debugging
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (order ids, upstream codes, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Expected-terminal condition that should be counted, not alerted on
    pub fn is_skippable(&self) -> bool {
        self.code.is_skippable()
    }

    // ==================== Convenience constructors ====================

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConfigMissing, msg)
    }

    /// Create a marketplace API error carrying the upstream code
    pub fn marketplace(upstream_code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::MarketplaceApi, msg)
            .with_detail("upstream_code", upstream_code.into())
    }

    /// Create a ledger store error
    pub fn ledger(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::LedgerStore, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TimeoutError, msg)
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::OrderNotFound);
        assert_eq!(err.code, ErrorCode::OrderNotFound);
        assert_eq!(err.message, "Order not found upstream");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_message() {
        let err = AppError::with_message(ErrorCode::WindowTooWide, "window spans 20 days");
        assert_eq!(err.code, ErrorCode::WindowTooWide);
        assert_eq!(err.message, "window spans 20 days");
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::marketplace("error_auth", "Invalid access_token")
            .with_detail("shop_id", 7654321);

        assert_eq!(err.code, ErrorCode::MarketplaceApi);
        let details = err.details.unwrap();
        assert_eq!(details.get("upstream_code").unwrap(), "error_auth");
        assert_eq!(details.get("shop_id").unwrap(), 7654321);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::LabelFailed, "task reported FAILED");
        assert_eq!(format!("{}", err), "task reported FAILED");
    }

    #[test]
    fn test_skippable_passthrough() {
        assert!(AppError::new(ErrorCode::LabelNotArranged).is_skippable());
        assert!(!AppError::new(ErrorCode::LabelTimeout).is_skippable());
    }
}
