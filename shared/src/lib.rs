//! Shared types for the Shoal order-sync agent
//!
//! Common types used across the marketplace client, warehouse client and
//! sync-agent crates: domain models, status translation and the unified
//! error system.

pub mod error;
pub mod models;
pub mod status;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{LedgerRow, Order, OrderLine, Recipient, RowId, ShopContext, LEDGER_COLUMNS};
pub use status::OrderStatus;
