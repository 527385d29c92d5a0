//! Unified error codes for the Shoal sync agent
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Configuration errors
//! - 2xxx: Marketplace API errors
//! - 3xxx: Ledger errors
//! - 4xxx: Label workflow errors
//! - 5xxx: Warehouse API errors
//! - 6xxx: Notification errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and stable reporting across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Configuration ====================
    /// Required configuration value missing
    ConfigMissing = 1001,
    /// Configuration value malformed
    ConfigInvalid = 1002,
    /// Shop context not configured
    ShopNotConfigured = 1003,

    // ==================== 2xxx: Marketplace ====================
    /// Marketplace API returned an error payload
    MarketplaceApi = 2001,
    /// Marketplace authentication failed (token/signature)
    MarketplaceAuth = 2002,
    /// Requested time window exceeds the API maximum
    WindowTooWide = 2003,
    /// Order not found upstream
    OrderNotFound = 2004,
    /// Marketplace response could not be parsed
    MarketplaceResponse = 2005,

    // ==================== 3xxx: Ledger ====================
    /// Ledger store read/write failed
    LedgerStore = 3001,
    /// Ledger row malformed
    LedgerRowInvalid = 3002,

    // ==================== 4xxx: Label workflow ====================
    /// Shipment was never arranged upstream (expected, skippable)
    LabelNotArranged = 4001,
    /// Parcel already picked up (expected, skippable)
    LabelAlreadyShipped = 4002,
    /// Channel does not allow programmatic printing (expected, skippable)
    LabelUnsupported = 4003,
    /// Document task did not reach READY within the poll budget
    LabelTimeout = 4004,
    /// Document task reported FAILED
    LabelFailed = 4005,
    /// Label file could not be stored
    LabelStorage = 4006,

    // ==================== 5xxx: Warehouse ====================
    /// Order already registered in the warehouse system
    WarehouseDuplicate = 5001,
    /// Warehouse API rate limit reached
    WarehouseRateLimited = 5002,
    /// Warehouse authentication failed
    WarehouseAuth = 5003,
    /// Warehouse rejected the payload
    WarehouseValidation = 5004,

    // ==================== 6xxx: Notification ====================
    /// Notification webhook delivery failed
    NotifyFailed = 6001,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Expected-terminal conditions: logged and counted, never alerted on
    #[inline]
    pub const fn is_skippable(&self) -> bool {
        matches!(
            self,
            ErrorCode::LabelNotArranged
                | ErrorCode::LabelAlreadyShipped
                | ErrorCode::LabelUnsupported
        )
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Configuration
            ErrorCode::ConfigMissing => "Required configuration value is missing",
            ErrorCode::ConfigInvalid => "Configuration value is malformed",
            ErrorCode::ShopNotConfigured => "Shop context is not configured",

            // Marketplace
            ErrorCode::MarketplaceApi => "Marketplace API returned an error",
            ErrorCode::MarketplaceAuth => "Marketplace authentication failed",
            ErrorCode::WindowTooWide => "Requested time window exceeds the API maximum",
            ErrorCode::OrderNotFound => "Order not found upstream",
            ErrorCode::MarketplaceResponse => "Marketplace response could not be parsed",

            // Ledger
            ErrorCode::LedgerStore => "Ledger store operation failed",
            ErrorCode::LedgerRowInvalid => "Ledger row is malformed",

            // Label workflow
            ErrorCode::LabelNotArranged => "Shipment has not been arranged yet",
            ErrorCode::LabelAlreadyShipped => "Parcel has already been picked up",
            ErrorCode::LabelUnsupported => "Channel does not support document printing",
            ErrorCode::LabelTimeout => "Label task did not become ready in time",
            ErrorCode::LabelFailed => "Label task failed",
            ErrorCode::LabelStorage => "Label file could not be stored",

            // Warehouse
            ErrorCode::WarehouseDuplicate => "Order is already registered in the warehouse",
            ErrorCode::WarehouseRateLimited => "Warehouse API rate limit reached",
            ErrorCode::WarehouseAuth => "Warehouse authentication failed",
            ErrorCode::WarehouseValidation => "Warehouse rejected the sales order",

            // Notification
            ErrorCode::NotifyFailed => "Notification delivery failed",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown numeric value to [`ErrorCode`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            1001 => Ok(ErrorCode::ConfigMissing),
            1002 => Ok(ErrorCode::ConfigInvalid),
            1003 => Ok(ErrorCode::ShopNotConfigured),
            2001 => Ok(ErrorCode::MarketplaceApi),
            2002 => Ok(ErrorCode::MarketplaceAuth),
            2003 => Ok(ErrorCode::WindowTooWide),
            2004 => Ok(ErrorCode::OrderNotFound),
            2005 => Ok(ErrorCode::MarketplaceResponse),
            3001 => Ok(ErrorCode::LedgerStore),
            3002 => Ok(ErrorCode::LedgerRowInvalid),
            4001 => Ok(ErrorCode::LabelNotArranged),
            4002 => Ok(ErrorCode::LabelAlreadyShipped),
            4003 => Ok(ErrorCode::LabelUnsupported),
            4004 => Ok(ErrorCode::LabelTimeout),
            4005 => Ok(ErrorCode::LabelFailed),
            4006 => Ok(ErrorCode::LabelStorage),
            5001 => Ok(ErrorCode::WarehouseDuplicate),
            5002 => Ok(ErrorCode::WarehouseRateLimited),
            5003 => Ok(ErrorCode::WarehouseAuth),
            5004 => Ok(ErrorCode::WarehouseValidation),
            6001 => Ok(ErrorCode::NotifyFailed),
            9001 => Ok(ErrorCode::InternalError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            other => Err(InvalidErrorCode(other)),
        }
    }
}
