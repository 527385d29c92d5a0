//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Configuration errors
/// - 2xxx: Marketplace API errors
/// - 3xxx: Ledger errors
/// - 4xxx: Label workflow errors
/// - 5xxx: Warehouse API errors
/// - 6xxx: Notification errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Configuration errors (1xxx)
    Config,
    /// Marketplace API errors (2xxx)
    Marketplace,
    /// Ledger errors (3xxx)
    Ledger,
    /// Label workflow errors (4xxx)
    Label,
    /// Warehouse API errors (5xxx)
    Warehouse,
    /// Notification errors (6xxx)
    Notify,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Config,
            2000..3000 => Self::Marketplace,
            3000..4000 => Self::Ledger,
            4000..5000 => Self::Label,
            5000..6000 => Self::Warehouse,
            6000..7000 => Self::Notify,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Config => "config",
            Self::Marketplace => "marketplace",
            Self::Ledger => "ledger",
            Self::Label => "label",
            Self::Warehouse => "warehouse",
            Self::Notify => "notify",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
