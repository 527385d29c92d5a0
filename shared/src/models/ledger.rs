//! Ledger row model
//!
//! One persisted record per (order, line) pair. The backing store exposes
//! positional rows; internally rows are addressed by [`RowId`] so the engine
//! never reasons about sheet positions directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of columns in the fixed ledger layout
pub const LEDGER_COLUMNS: usize = 19;

/// Opaque row identifier assigned by the ledger store
///
/// For sheet-backed stores this wraps the 1-based data row position
/// (row 1 of the sheet is the header and is never addressed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ledger row
///
/// All cells are stored as the sheet stores them: strings, empty meaning
/// unset. The manual columns (note, cost, profit, profit-with-refund and
/// commission) are never computed by the core; they are carried through
/// untouched on updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Order date rendered in the shop timezone
    pub order_date: String,
    /// Translated status label (or raw code for rows written by hand)
    pub status: String,
    /// Country/shop label
    pub country: String,
    /// Marketplace order identifier — the dedup key
    pub order_sn: String,
    pub product_name: String,
    pub variation_1: String,
    pub variation_2: String,
    pub sku: String,
    pub quantity: String,
    /// Shipping-label reference, empty until a label is written
    pub label_url: String,
    pub shipped: bool,
    /// Free-text note, manual entry only
    pub note: String,
    /// Reserved blank column
    pub reserved: String,
    /// Order total, recorded on the first row of the order only
    pub revenue: String,
    /// Manual entry
    pub commission: String,
    /// Shipping fee, recorded on the first row of the order only
    pub shipping_fee: String,
    /// Manual entry
    pub cost: String,
    /// Manual entry
    pub profit: String,
    /// Manual entry
    pub profit_with_refund: String,
}

impl LedgerRow {
    /// Whether this row carries a non-empty label reference
    pub fn has_label(&self) -> bool {
        !self.label_url.trim().is_empty()
    }

    /// Serialize to the fixed positional cell layout
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.order_date.clone(),
            self.status.clone(),
            self.country.clone(),
            self.order_sn.clone(),
            self.product_name.clone(),
            self.variation_1.clone(),
            self.variation_2.clone(),
            self.sku.clone(),
            self.quantity.clone(),
            self.label_url.clone(),
            if self.shipped { "TRUE" } else { "" }.to_string(),
            self.note.clone(),
            self.reserved.clone(),
            self.revenue.clone(),
            self.commission.clone(),
            self.shipping_fee.clone(),
            self.cost.clone(),
            self.profit.clone(),
            self.profit_with_refund.clone(),
        ]
    }

    /// Parse from positional cells, padding short rows with empty cells
    ///
    /// Sheets drop trailing empty cells, so a short row is normal, not an
    /// error.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
        Self {
            order_date: cell(0),
            status: cell(1),
            country: cell(2),
            order_sn: cell(3),
            product_name: cell(4),
            variation_1: cell(5),
            variation_2: cell(6),
            sku: cell(7),
            quantity: cell(8),
            label_url: cell(9),
            shipped: cell(10) == "TRUE",
            note: cell(11),
            reserved: cell(12),
            revenue: cell(13),
            commission: cell(14),
            shipping_fee: cell(15),
            cost: cell(16),
            profit: cell(17),
            profit_with_refund: cell(18),
        }
    }

    /// Header row for a freshly created sheet
    pub fn header() -> Vec<String> {
        [
            "Date",
            "Status",
            "Country",
            "Order ID",
            "Product",
            "Variation 1",
            "Variation 2",
            "SKU",
            "Qty",
            "Label",
            "Shipped",
            "Note",
            "",
            "Revenue",
            "Commission",
            "Shipping Fee",
            "Cost",
            "Profit",
            "Profit (Refund)",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_roundtrip() {
        let row = LedgerRow {
            order_date: "2026-08-01 10:30".to_string(),
            status: "発送待ち".to_string(),
            country: "SG".to_string(),
            order_sn: "X001".to_string(),
            product_name: "Ceramic Mug".to_string(),
            variation_1: "Red".to_string(),
            variation_2: "Large".to_string(),
            sku: "MUG-01".to_string(),
            quantity: "2".to_string(),
            label_url: String::new(),
            shipped: false,
            note: "fragile".to_string(),
            reserved: String::new(),
            revenue: "50.00".to_string(),
            commission: String::new(),
            shipping_fee: "3.50".to_string(),
            cost: String::new(),
            profit: String::new(),
            profit_with_refund: String::new(),
        };

        let cells = row.to_cells();
        assert_eq!(cells.len(), LEDGER_COLUMNS);
        assert_eq!(LedgerRow::from_cells(&cells), row);
    }

    #[test]
    fn test_shipped_flag_cell() {
        let mut row = LedgerRow::default();
        row.shipped = true;
        assert_eq!(row.to_cells()[10], "TRUE");
        row.shipped = false;
        assert_eq!(row.to_cells()[10], "");
    }

    #[test]
    fn test_short_row_is_padded() {
        let cells = vec![
            "2026-08-01".to_string(),
            "発送待ち".to_string(),
            "SG".to_string(),
            "X001".to_string(),
        ];
        let row = LedgerRow::from_cells(&cells);
        assert_eq!(row.order_sn, "X001");
        assert_eq!(row.label_url, "");
        assert!(!row.shipped);
        assert!(!row.has_label());
    }

    #[test]
    fn test_has_label_ignores_whitespace() {
        let mut row = LedgerRow::default();
        assert!(!row.has_label());
        row.label_url = "  ".to_string();
        assert!(!row.has_label());
        row.label_url = "https://files.example/label_X001.pdf".to_string();
        assert!(row.has_label());
    }

    #[test]
    fn test_header_width_matches_layout() {
        assert_eq!(LedgerRow::header().len(), LEDGER_COLUMNS);
    }
}
