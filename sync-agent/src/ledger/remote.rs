//! HTTP-backed sheet store
//!
//! Thin wrapper over a sheet-values REST API (`GET`/append/`PUT` on
//! `A:S` ranges). No algorithmic logic lives here; the engine treats this
//! exactly like [`MemorySheet`](super::store::MemorySheet).

use super::store::{SheetStore, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{LedgerRow, RowId};

/// Last column letter of the fixed 19-column layout
const LAST_COLUMN: char = 'S';

/// Sheet-values REST store
pub struct RemoteSheet {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    token: String,
}

#[derive(Debug, Default, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
struct AppendUpdates {
    #[serde(rename = "updatedRange")]
    updated_range: String,
}

impl RemoteSheet {
    pub fn new(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            token: token.into(),
        }
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.base_url.trim_end_matches('/'),
            self.spreadsheet_id,
            range
        )
    }

    fn row_range(&self, row: u32) -> String {
        format!("{}!A{row}:{LAST_COLUMN}{row}", self.sheet_name)
    }
}

#[async_trait]
impl SheetStore for RemoteSheet {
    async fn load(&self) -> StoreResult<Vec<(RowId, LedgerRow)>> {
        let range = format!("{}!A2:{LAST_COLUMN}", self.sheet_name);
        let response = self
            .client
            .get(self.values_url(&range))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;

        let body: ValuesResponse = response.json().await?;
        Ok(body
            .values
            .into_iter()
            .enumerate()
            .map(|(i, cells)| (RowId(i as u32 + 2), LedgerRow::from_cells(&cells)))
            .collect())
    }

    async fn append(&self, rows: &[LedgerRow]) -> StoreResult<Vec<RowId>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let range = format!("{}!A1:{LAST_COLUMN}", self.sheet_name);
        let values: Vec<Vec<String>> = rows.iter().map(LedgerRow::to_cells).collect();
        let response = self
            .client
            .post(format!(
                "{}:append?valueInputOption=RAW&insertDataOption=INSERT_ROWS",
                self.values_url(&range)
            ))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "values": values }))
            .send()
            .await?
            .error_for_status()?;

        let body: AppendResponse = response.json().await?;
        let first = parse_range_start(&body.updates.updated_range)?;
        Ok((0..rows.len() as u32).map(|i| RowId(first + i)).collect())
    }

    async fn update(&self, updates: &[(RowId, LedgerRow)]) -> StoreResult<()> {
        // The values API updates one contiguous range at a time; updates are
        // sparse, so write row by row.
        for (id, row) in updates {
            self.client
                .put(format!(
                    "{}?valueInputOption=RAW",
                    self.values_url(&self.row_range(id.0))
                ))
                .bearer_auth(&self.token)
                .json(&serde_json::json!({ "values": [row.to_cells()] }))
                .send()
                .await?
                .error_for_status()?;
        }
        Ok(())
    }
}

/// Extract the first row number from an A1-notation range like `SG!A5:S6`
fn parse_range_start(range: &str) -> StoreResult<u32> {
    let cells = range.rsplit('!').next().unwrap_or(range);
    let start = cells.split(':').next().unwrap_or(cells);
    let digits: String = start.chars().filter(|c| c.is_ascii_digit()).collect();
    digits
        .parse()
        .map_err(|_| StoreError::Malformed(format!("range {range:?} has no row number")))
}
