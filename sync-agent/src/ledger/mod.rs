//! Order ledger
//!
//! Maps marketplace orders to persisted sheet rows: one row per line item,
//! deduplicated by order identifier. The engine detects status transitions,
//! finds orders still lacking a shipping label and writes label references
//! back — always to every row of an order, never to a subset.

pub mod remote;
pub mod store;

pub use remote::RemoteSheet;
pub use store::{MemorySheet, SheetStore, StoreError};

use shared::status::is_awaiting_shipment_text;
use shared::{LedgerRow, Order, RowId, ShopContext};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Ledger error type
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Backing store failed
    #[error("Ledger store error: {0}")]
    Store(#[from] StoreError),
}

/// Result of one reconciliation pass
#[derive(Debug, Default)]
pub struct ReconcileSummary {
    /// Orders appended for the first time
    pub added: usize,
    /// Orders whose status changed
    pub updated: usize,
    /// The orders that were appended, in input order
    pub added_orders: Vec<Order>,
    /// The orders whose status changed, in input order
    pub updated_orders: Vec<Order>,
}

/// An order that still needs a label, with every row it owns
#[derive(Debug, Clone)]
pub struct MissingLabel {
    pub order_sn: String,
    /// Status as stored in the ledger
    pub status: String,
    /// All row handles of this order, so the label reaches every row
    pub rows: Vec<RowId>,
}

/// The order ledger for one shop
pub struct OrderLedger {
    store: Arc<dyn SheetStore>,
    shop: ShopContext,
}

impl OrderLedger {
    pub fn new(store: Arc<dyn SheetStore>, shop: ShopContext) -> Self {
        Self { store, shop }
    }

    /// Reconcile fetched orders against the stored rows
    ///
    /// New orders are expanded to one row per line item (one placeholder row
    /// when an order has no lines) and appended. Known orders whose
    /// translated status differs from the stored one have status and
    /// shipped-flag rewritten on every row, and the order total and shipping
    /// fee refreshed on the first row only. Running the same pass twice is a
    /// no-op the second time.
    pub async fn reconcile(&self, orders: &[Order]) -> Result<ReconcileSummary, LedgerError> {
        let existing = self.store.load().await?;
        let mut by_sn: HashMap<&str, Vec<(RowId, &LedgerRow)>> = HashMap::new();
        for (id, row) in &existing {
            by_sn.entry(row.order_sn.as_str()).or_default().push((*id, row));
        }

        let mut summary = ReconcileSummary::default();
        let mut to_append: Vec<LedgerRow> = Vec::new();
        let mut to_update: Vec<(RowId, LedgerRow)> = Vec::new();
        let mut seen_this_pass: std::collections::HashSet<&str> = std::collections::HashSet::new();

        for order in orders {
            if !seen_this_pass.insert(order.order_sn.as_str()) {
                // same order twice in one batch; first occurrence wins
                continue;
            }

            match by_sn.get(order.order_sn.as_str()) {
                None => {
                    to_append.extend(self.expand(order));
                    summary.added += 1;
                    summary.added_orders.push(order.clone());
                    tracing::debug!(
                        shop = %self.shop.code,
                        order_sn = %order.order_sn,
                        lines = order.lines.len(),
                        "New order, appending rows"
                    );
                }
                Some(rows) => {
                    let label = order.status.label();
                    if rows[0].1.status == label {
                        continue;
                    }

                    for (i, (id, row)) in rows.iter().enumerate() {
                        let mut updated = (*row).clone();
                        updated.status = label.to_string();
                        updated.shipped = order.status.is_shipped();
                        if i == 0 {
                            updated.revenue = order.total_amount.to_string();
                            updated.shipping_fee = order.shipping_fee.to_string();
                        }
                        to_update.push((*id, updated));
                    }
                    summary.updated += 1;
                    summary.updated_orders.push(order.clone());
                    tracing::info!(
                        shop = %self.shop.code,
                        order_sn = %order.order_sn,
                        from = %rows[0].1.status,
                        to = %label,
                        "Order status changed"
                    );
                }
            }
        }

        if !to_append.is_empty() {
            self.store.append(&to_append).await?;
        }
        if !to_update.is_empty() {
            self.store.update(&to_update).await?;
        }

        Ok(summary)
    }

    /// Expand an order to its row set: one row per line, at least one row
    fn expand(&self, order: &Order) -> Vec<LedgerRow> {
        let order_date = order
            .created_at
            .with_timezone(&self.shop.timezone)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        let status = order.status.label().to_string();
        let shipped = order.status.is_shipped();

        let base = LedgerRow {
            order_date,
            status,
            country: self.shop.country_label.clone(),
            order_sn: order.order_sn.clone(),
            shipped,
            ..Default::default()
        };

        if order.lines.is_empty() {
            // placeholder row keeps the one-row-per-order minimum
            let mut row = base;
            row.revenue = order.total_amount.to_string();
            row.shipping_fee = order.shipping_fee.to_string();
            return vec![row];
        }

        order
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let (variation_1, variation_2) = line.variation_pair();
                let mut row = base.clone();
                row.product_name = line.product_name.clone();
                row.variation_1 = variation_1;
                row.variation_2 = variation_2;
                row.sku = line.sku.clone();
                row.quantity = line.quantity.to_string();
                if i == 0 {
                    // full order amounts live on the first row only
                    row.revenue = order.total_amount.to_string();
                    row.shipping_fee = order.shipping_fee.to_string();
                }
                row
            })
            .collect()
    }

    /// Find up to `limit` orders that still lack a shipping label
    ///
    /// An order qualifies when none of its rows carries a label reference and
    /// its stored status is in the awaiting-shipment set — matched against
    /// both translated and raw spellings.
    pub async fn find_missing_label(&self, limit: usize) -> Result<Vec<MissingLabel>, LedgerError> {
        let existing = self.store.load().await?;

        let mut order_of_sn: Vec<String> = Vec::new();
        let mut groups: HashMap<String, MissingLabelBuilder> = HashMap::new();
        for (id, row) in &existing {
            if row.order_sn.is_empty() {
                continue;
            }
            let entry = groups.entry(row.order_sn.clone()).or_insert_with(|| {
                order_of_sn.push(row.order_sn.clone());
                MissingLabelBuilder {
                    status: row.status.clone(),
                    rows: Vec::new(),
                    has_label: false,
                }
            });
            entry.rows.push(*id);
            entry.has_label |= row.has_label();
        }

        let mut missing = Vec::new();
        for sn in order_of_sn {
            let group = &groups[&sn];
            if group.has_label || !is_awaiting_shipment_text(&group.status) {
                continue;
            }
            missing.push(MissingLabel {
                order_sn: sn,
                status: group.status.clone(),
                rows: group.rows.clone(),
            });
            if missing.len() == limit {
                break;
            }
        }
        Ok(missing)
    }

    /// Write a label reference to every given row
    ///
    /// Idempotent: rows already carrying `url` are left untouched.
    pub async fn write_label(&self, rows: &[RowId], url: &str) -> Result<(), LedgerError> {
        let existing: HashMap<RowId, LedgerRow> =
            self.store.load().await?.into_iter().collect();

        let mut updates = Vec::new();
        for id in rows {
            if let Some(row) = existing.get(id) {
                if row.label_url == url {
                    continue;
                }
                let mut updated = row.clone();
                updated.label_url = url.to_string();
                updates.push((*id, updated));
            }
        }
        if !updates.is_empty() {
            self.store.update(&updates).await?;
        }
        Ok(())
    }

    /// All rows currently stored for one order, in sheet order
    pub async fn rows_for_order(&self, order_sn: &str) -> Result<Vec<LedgerRow>, LedgerError> {
        Ok(self
            .store
            .load()
            .await?
            .into_iter()
            .filter(|(_, row)| row.order_sn == order_sn)
            .map(|(_, row)| row)
            .collect())
    }
}

struct MissingLabelBuilder {
    status: String,
    rows: Vec<RowId>,
    has_label: bool,
}
