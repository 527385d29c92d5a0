//! Shoal Sync Agent
//!
//! Polls the marketplace for orders, reconciles them into the
//! spreadsheet-backed ledger, drives the shipping-label workflow for orders
//! that still lack a label, and forwards new orders to the warehouse
//! management API. One invocation is one run-to-completion cycle; the host
//! scheduler guarantees at most one concurrent run.
//!
//! # Module structure
//!
//! ```text
//! sync-agent/src/
//! ├── config.rs      # env-driven configuration + shop contexts
//! ├── ledger/        # reconcile engine + sheet store boundary
//! ├── label/         # label workflow state machine + storage
//! ├── fulfillment.rs # warehouse payload conversion + batch submission
//! ├── notify.rs      # best-effort webhook notifications
//! ├── runner.rs      # per-shop run cycle
//! └── logger.rs      # tracing setup
//! ```

pub mod config;
pub mod fulfillment;
pub mod label;
pub mod ledger;
pub mod logger;
pub mod notify;
pub mod runner;

pub use config::Config;
pub use runner::{RunReport, RunSettings, ShopPipeline, SyncAgent};

pub fn print_banner() {
    println!(
        r#"
   _____ __               __
  / ___// /_  ____  ____ _/ /
  \__ \/ __ \/ __ \/ __ `/ /
 ___/ / / / / /_/ / /_/ / /
/____/_/ /_/\____/\__,_/_/
        sync agent
    "#
    );
}
