//! Shoal Warehouse Client - REST client for the warehouse management API
//!
//! Submits sales orders on behalf of the sync agent. Bearer-token
//! authenticated; a 401 triggers a one-shot token refresh and a single
//! retry, a 429 surfaces as a distinct rate-limit error carrying the reset
//! metadata the server sent.

pub mod client;
pub mod error;
pub mod types;

pub use client::{TokenProvider, WarehouseClient, WarehouseTransport, WireReply};
pub use error::{WarehouseError, WarehouseResult};
pub use types::{OrderAttribute, SalesOrder, SalesOrderAck, SalesOrderLine};
