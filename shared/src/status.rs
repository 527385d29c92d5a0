//! Marketplace order status translation
//!
//! Fixed mapping from upstream status codes to the display labels written
//! into the ledger. Unknown codes pass through unchanged so a new upstream
//! status never breaks a run.
//!
//! Two deliberately distinct subsets exist and must not be merged:
//! - the *shipped* set drives the shipped-flag on ledger rows;
//! - the *awaiting-shipment* set drives label eligibility.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream order status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Unpaid,
    ReadyToShip,
    Processed,
    Shipped,
    ToConfirmReceive,
    InCancel,
    Cancelled,
    ToReturn,
    Completed,
    InvoicePending,
    /// Forward-compatible passthrough for codes this build does not know
    Unknown(String),
}

impl OrderStatus {
    /// Parse an upstream status code
    pub fn from_code(code: &str) -> Self {
        match code {
            "UNPAID" => Self::Unpaid,
            "READY_TO_SHIP" => Self::ReadyToShip,
            "PROCESSED" => Self::Processed,
            "SHIPPED" => Self::Shipped,
            "TO_CONFIRM_RECEIVE" => Self::ToConfirmReceive,
            "IN_CANCEL" => Self::InCancel,
            "CANCELLED" => Self::Cancelled,
            "TO_RETURN" => Self::ToReturn,
            "COMPLETED" => Self::Completed,
            "INVOICE_PENDING" => Self::InvoicePending,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The raw upstream code
    pub fn code(&self) -> &str {
        match self {
            Self::Unpaid => "UNPAID",
            Self::ReadyToShip => "READY_TO_SHIP",
            Self::Processed => "PROCESSED",
            Self::Shipped => "SHIPPED",
            Self::ToConfirmReceive => "TO_CONFIRM_RECEIVE",
            Self::InCancel => "IN_CANCEL",
            Self::Cancelled => "CANCELLED",
            Self::ToReturn => "TO_RETURN",
            Self::Completed => "COMPLETED",
            Self::InvoicePending => "INVOICE_PENDING",
            Self::Unknown(code) => code,
        }
    }

    /// Translated display label written into the ledger
    ///
    /// Unknown codes pass through unchanged.
    pub fn label(&self) -> &str {
        match self {
            Self::Unpaid => "未払い",
            Self::ReadyToShip => "発送待ち",
            Self::Processed => "処理済み",
            Self::Shipped => "発送済み",
            Self::ToConfirmReceive => "受取確認待ち",
            Self::InCancel => "キャンセル中",
            Self::Cancelled => "キャンセル済み",
            Self::ToReturn => "返品中",
            Self::Completed => "取引完了",
            Self::InvoicePending => "請求書待ち",
            Self::Unknown(code) => code,
        }
    }

    /// Shipped set: the parcel has left the seller's custody
    ///
    /// Distinct from [`Self::is_awaiting_shipment`] and must stay that way.
    pub fn is_shipped(&self) -> bool {
        matches!(self, Self::Shipped | Self::Completed | Self::ToReturn)
    }

    /// Awaiting-shipment set: a shipping label may still be generated
    pub fn is_awaiting_shipment(&self) -> bool {
        matches!(self, Self::ReadyToShip | Self::Processed)
    }
}

/// Match a ledger status cell against the awaiting-shipment set
///
/// Ledger rows carry the translated label, but rows written by earlier tool
/// versions (or by hand) may carry the raw upstream code. Both spellings
/// must qualify.
pub fn is_awaiting_shipment_text(text: &str) -> bool {
    for status in [OrderStatus::ReadyToShip, OrderStatus::Processed] {
        if text == status.code() || text == status.label() {
            return true;
        }
    }
    false
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for OrderStatus {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.code().to_string()
    }
}
