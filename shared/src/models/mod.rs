//! Domain models

pub mod ledger;
pub mod order;
pub mod shop;

pub use ledger::{LedgerRow, RowId, LEDGER_COLUMNS};
pub use order::{Order, OrderLine, Recipient};
pub use shop::ShopContext;
