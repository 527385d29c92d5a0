//! Sheet store boundary
//!
//! The persistence engine behind the ledger is an external tabular store
//! exposing positional rows. The engine only talks to this trait; row
//! positions never leak past the [`RowId`] handles the store assigns.

use async_trait::async_trait;
use shared::{LedgerRow, RowId};
use thiserror::Error;
use tokio::sync::Mutex;

/// Sheet store error type
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store response could not be interpreted
    #[error("Malformed store response: {0}")]
    Malformed(String),

    /// Row handle does not exist in the store
    #[error("Unknown row {0}")]
    UnknownRow(RowId),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Boundary to the tabular ledger store
///
/// Row 1 of the backing sheet is the header; data rows are addressed from 2.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Load all data rows with their handles, in sheet order
    async fn load(&self) -> StoreResult<Vec<(RowId, LedgerRow)>>;

    /// Append rows after the last data row, returning their new handles
    async fn append(&self, rows: &[LedgerRow]) -> StoreResult<Vec<RowId>>;

    /// Overwrite existing rows in place
    async fn update(&self, updates: &[(RowId, LedgerRow)]) -> StoreResult<()>;
}

/// In-memory sheet store
///
/// Mirrors the positional semantics of a real sheet (handles start at row 2)
/// so engine tests exercise the same addressing as production.
#[derive(Default)]
pub struct MemorySheet {
    rows: Mutex<Vec<LedgerRow>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the sheet with existing rows
    pub async fn seed(&self, rows: Vec<LedgerRow>) {
        *self.rows.lock().await = rows;
    }

    /// Snapshot of the current rows, for assertions
    pub async fn snapshot(&self) -> Vec<LedgerRow> {
        self.rows.lock().await.clone()
    }

    fn index_of(id: RowId) -> usize {
        (id.0 as usize).saturating_sub(2)
    }
}

#[async_trait]
impl SheetStore for MemorySheet {
    async fn load(&self) -> StoreResult<Vec<(RowId, LedgerRow)>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, row)| (RowId(i as u32 + 2), row.clone()))
            .collect())
    }

    async fn append(&self, rows: &[LedgerRow]) -> StoreResult<Vec<RowId>> {
        let mut stored = self.rows.lock().await;
        let first = stored.len() as u32 + 2;
        stored.extend_from_slice(rows);
        Ok((0..rows.len() as u32).map(|i| RowId(first + i)).collect())
    }

    async fn update(&self, updates: &[(RowId, LedgerRow)]) -> StoreResult<()> {
        let mut stored = self.rows.lock().await;
        for (id, row) in updates {
            let index = Self::index_of(*id);
            let slot = stored.get_mut(index).ok_or(StoreError::UnknownRow(*id))?;
            *slot = row.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order_sn: &str) -> LedgerRow {
        LedgerRow {
            order_sn: order_sn.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_append_assigns_sheet_positions() {
        let sheet = MemorySheet::new();
        let ids = sheet.append(&[row("A"), row("B")]).await.unwrap();
        assert_eq!(ids, vec![RowId(2), RowId(3)]);

        let ids = sheet.append(&[row("C")]).await.unwrap();
        assert_eq!(ids, vec![RowId(4)]);
    }

    #[tokio::test]
    async fn test_load_returns_rows_in_order() {
        let sheet = MemorySheet::new();
        sheet.append(&[row("A"), row("B")]).await.unwrap();

        let loaded = sheet.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].0, RowId(2));
        assert_eq!(loaded[0].1.order_sn, "A");
        assert_eq!(loaded[1].1.order_sn, "B");
    }

    #[tokio::test]
    async fn test_update_overwrites_in_place() {
        let sheet = MemorySheet::new();
        let ids = sheet.append(&[row("A"), row("B")]).await.unwrap();

        let mut changed = row("A");
        changed.status = "発送済み".to_string();
        sheet.update(&[(ids[0], changed)]).await.unwrap();

        let rows = sheet.snapshot().await;
        assert_eq!(rows[0].status, "発送済み");
        assert_eq!(rows[1].status, "");
    }

    #[tokio::test]
    async fn test_update_unknown_row_fails() {
        let sheet = MemorySheet::new();
        let result = sheet.update(&[(RowId(9), row("X"))]).await;
        assert!(matches!(result, Err(StoreError::UnknownRow(RowId(9)))));
    }
}
