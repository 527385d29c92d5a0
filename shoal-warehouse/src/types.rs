//! Wire types for the warehouse sales-order API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request envelope for `POST /sales_orders/new`
#[derive(Debug, Clone, Serialize)]
pub struct SalesOrderRequest {
    pub sales_order: SalesOrder,
}

/// One sales order as the warehouse system expects it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOrder {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub zipcode: String,
    /// Warehouse payment-method code (mapped, with default fallback)
    pub payment_method: String,
    /// Warehouse carrier code (mapped, with default fallback)
    pub carrier: String,
    /// Order date as the warehouse expects it (YYYY-MM-DD)
    pub ordered_at: String,
    pub lines: Vec<SalesOrderLine>,
    /// Free-form traceability attributes (marketplace order id/shop/status)
    pub attributes: Vec<OrderAttribute>,
}

/// One line of a sales order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOrderLine {
    pub sku: String,
    pub name: String,
    /// Unit price in the order currency
    pub price: Decimal,
    pub quantity: u32,
    /// Option descriptor, e.g. "Red Large"
    #[serde(default)]
    pub option: String,
}

/// Free-form attribute pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAttribute {
    pub name: String,
    pub value: String,
}

impl OrderAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Acknowledgement of a successful submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesOrderAck {
    /// Warehouse-side identifier of the created sales order
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// Error payload the warehouse returns on rejection
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl WarehouseErrorBody {
    /// Whether this payload is the "already registered" duplicate signal
    pub fn is_duplicate(&self) -> bool {
        self.code == "already_registered"
            || self.message.to_ascii_lowercase().contains("duplicate")
            || self.message.to_ascii_lowercase().contains("already registered")
    }
}
