//! Shoal Marketplace Client - signed HTTP client for the marketplace API
//!
//! Provides authenticated access to the order endpoints (list/detail) and
//! the shipping-document endpoints (tracking lookup, create, poll, download).
//! Business sequencing of the label workflow lives in the sync agent; this
//! crate is the transport.

pub mod client;
pub mod config;
pub mod error;
pub mod label;
pub mod sign;
pub mod types;

pub use client::MarketplaceClient;
pub use config::MarketplaceConfig;
pub use error::{MarketplaceError, MarketplaceResult};
pub use label::{DocumentStatus, LabelTransport};
pub use types::OrderSummary;
