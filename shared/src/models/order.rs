//! Marketplace order model

use crate::status::OrderStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One purchased line within an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_name: String,
    /// Seller SKU (may be empty when the listing has none)
    pub sku: String,
    /// Variation descriptor as sent upstream, e.g. "Red,Large"
    pub variation: String,
    pub quantity: u32,
    /// Discounted unit price in the order currency
    pub item_price: Decimal,
}

impl OrderLine {
    /// Split the variation descriptor into the two ledger variation columns
    ///
    /// Upstream concatenates tier options with a comma; anything past the
    /// second tier stays in the second column untouched.
    pub fn variation_pair(&self) -> (String, String) {
        match self.variation.split_once(',') {
            Some((first, rest)) => (first.trim().to_string(), rest.trim().to_string()),
            None => (self.variation.trim().to_string(), String::new()),
        }
    }
}

/// Buyer/recipient information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    pub full_address: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

/// A marketplace order
///
/// The order identifier is stable and globally unique per shop; an order may
/// be re-fetched any number of times and must merge idempotently downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Marketplace-issued order identifier
    pub order_sn: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub recipient: Recipient,
    pub lines: Vec<OrderLine>,
    /// Order total in the order currency
    pub total_amount: Decimal,
    /// Shipping fee actually charged
    pub shipping_fee: Decimal,
    pub currency: String,
    pub payment_method: String,
    pub shipping_carrier: String,
    /// Shop code this order was fetched under
    pub shop_code: String,
}
