//! Run orchestration
//!
//! One [`ShopPipeline`] per shop ties the pieces together for a run cycle:
//! fetch recent orders, reconcile the ledger, chase missing labels, forward
//! new orders to the warehouse. [`SyncAgent`] walks all shops sequentially
//! and reports each outcome over the notifier; an unexpected error is
//! notified best-effort and then propagated.

use crate::fulfillment::{FulfillmentBridge, FulfillmentReport};
use crate::label::{LabelOutcome, LabelWorkflow};
use crate::ledger::{LedgerError, OrderLedger};
use crate::notify::{Attachment, Notifier};
use async_trait::async_trait;
use shared::{AppError, ErrorCode, Order, ShopContext};
use shoal_marketplace::{MarketplaceClient, MarketplaceError, MarketplaceResult};
use std::sync::Arc;
use thiserror::Error;

/// Run error type
#[derive(Debug, Error)]
pub enum RunError {
    /// Order fetch failed; nothing in this shop's cycle could proceed
    #[error("Marketplace error: {0}")]
    Marketplace(#[from] MarketplaceError),

    /// Ledger store failed
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl RunError {
    /// Classify as a coded application error for run reporting
    pub fn to_app_error(&self) -> AppError {
        match self {
            Self::Marketplace(e) => match e {
                MarketplaceError::Auth(msg) => {
                    AppError::with_message(ErrorCode::MarketplaceAuth, msg)
                }
                MarketplaceError::Api { code, message } => AppError::marketplace(code, message),
                MarketplaceError::WindowTooWide { days, max } => {
                    AppError::with_message(ErrorCode::WindowTooWide, e.to_string())
                        .with_detail("days", *days)
                        .with_detail("max", *max)
                }
                MarketplaceError::Http(_) => {
                    AppError::with_message(ErrorCode::NetworkError, e.to_string())
                }
                other => AppError::with_message(ErrorCode::MarketplaceResponse, other.to_string()),
            },
            Self::Ledger(e) => AppError::ledger(e.to_string()),
        }
    }
}

/// Order fetch seam
///
/// Implemented by [`MarketplaceClient`]; pipelines depend on this trait so a
/// cycle can be exercised without a network.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn latest_orders(&self, limit: usize, days_back: i64) -> MarketplaceResult<Vec<Order>>;
}

#[async_trait]
impl OrderSource for MarketplaceClient {
    async fn latest_orders(&self, limit: usize, days_back: i64) -> MarketplaceResult<Vec<Order>> {
        MarketplaceClient::latest_orders(self, limit, days_back).await
    }
}

/// Per-run knobs shared by every shop
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Maximum orders fetched per shop
    pub order_limit: usize,
    /// Look-back window in days
    pub days_back: i64,
    /// Maximum label workflows per shop
    pub label_limit: usize,
}

/// What one shop's cycle did
#[derive(Debug, Default)]
pub struct RunReport {
    pub shop_code: String,
    pub fetched: usize,
    pub added: usize,
    pub updated: usize,
    pub added_order_sns: Vec<String>,
    pub labels_stored: usize,
    pub labels_skipped: usize,
    /// Per-order label failures; siblings kept processing
    pub label_failures: Vec<(String, String)>,
    pub fulfillment: Option<FulfillmentReport>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.label_failures.is_empty()
            && self.fulfillment.as_ref().map_or(true, |f| f.is_clean())
    }
}

/// The full run cycle for one shop
pub struct ShopPipeline {
    shop: ShopContext,
    orders: Arc<dyn OrderSource>,
    ledger: OrderLedger,
    labels: LabelWorkflow,
    /// Absent when fulfillment forwarding is disabled
    fulfillment: Option<FulfillmentBridge>,
    settings: RunSettings,
}

impl ShopPipeline {
    pub fn new(
        shop: ShopContext,
        orders: Arc<dyn OrderSource>,
        ledger: OrderLedger,
        labels: LabelWorkflow,
        fulfillment: Option<FulfillmentBridge>,
        settings: RunSettings,
    ) -> Self {
        Self {
            shop,
            orders,
            ledger,
            labels,
            fulfillment,
            settings,
        }
    }

    pub fn shop_code(&self) -> &str {
        &self.shop.code
    }

    /// Run one cycle for this shop
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let mut report = RunReport {
            shop_code: self.shop.code.clone(),
            ..Default::default()
        };

        let orders = self
            .orders
            .latest_orders(self.settings.order_limit, self.settings.days_back)
            .await?;
        report.fetched = orders.len();
        tracing::info!(shop = %self.shop.code, fetched = orders.len(), "Fetched orders");

        let summary = self.ledger.reconcile(&orders).await?;
        report.added = summary.added;
        report.updated = summary.updated;
        report.added_order_sns = summary
            .added_orders
            .iter()
            .map(|o| o.order_sn.clone())
            .collect();

        self.chase_labels(&mut report).await?;

        if let Some(bridge) = &self.fulfillment {
            let batch = self.fulfillment_batch(&summary.added_orders).await?;
            if !batch.is_empty() {
                report.fulfillment = Some(bridge.submit_batch(&batch).await);
            }
        }

        tracing::info!(
            shop = %self.shop.code,
            added = report.added,
            updated = report.updated,
            labels = report.labels_stored,
            "Cycle finished"
        );
        Ok(report)
    }

    /// Run the label workflow for every order still lacking one
    ///
    /// One order's failure never aborts the siblings.
    async fn chase_labels(&self, report: &mut RunReport) -> Result<(), RunError> {
        let missing = self
            .ledger
            .find_missing_label(self.settings.label_limit)
            .await?;
        for candidate in missing {
            match self.labels.run(&candidate.order_sn).await {
                Ok(LabelOutcome::Stored { reference, .. }) => {
                    self.ledger.write_label(&candidate.rows, &reference).await?;
                    report.labels_stored += 1;
                }
                Ok(LabelOutcome::Skipped { reason, .. }) => {
                    tracing::info!(
                        shop = %self.shop.code,
                        order_sn = %candidate.order_sn,
                        %reason,
                        "Label skipped"
                    );
                    report.labels_skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        shop = %self.shop.code,
                        order_sn = %candidate.order_sn,
                        error = %e,
                        "Label workflow failed"
                    );
                    report
                        .label_failures
                        .push((candidate.order_sn.clone(), e.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Newly-added awaiting-shipment orders paired with their ledger rows
    async fn fulfillment_batch(
        &self,
        added: &[Order],
    ) -> Result<Vec<(Order, Vec<shared::LedgerRow>)>, RunError> {
        let mut batch = Vec::new();
        for order in added {
            if !order.status.is_awaiting_shipment() {
                continue;
            }
            let rows = self.ledger.rows_for_order(&order.order_sn).await?;
            batch.push((order.clone(), rows));
        }
        Ok(batch)
    }
}

/// Walks every shop pipeline sequentially and notifies the outcome
pub struct SyncAgent {
    pipelines: Vec<ShopPipeline>,
    notifier: Notifier,
}

impl SyncAgent {
    pub fn new(pipelines: Vec<ShopPipeline>, notifier: Notifier) -> Self {
        Self {
            pipelines,
            notifier,
        }
    }

    /// Run every shop once
    ///
    /// A failing shop is notified and then propagated; shops earlier in the
    /// list keep their completed work.
    pub async fn run_all(&self) -> Result<Vec<RunReport>, RunError> {
        let mut reports = Vec::new();
        for pipeline in &self.pipelines {
            match pipeline.run().await {
                Ok(report) => {
                    let (text, attachments) = report_message(&report);
                    self.notifier.send(&text, &attachments).await;
                    reports.push(report);
                }
                Err(e) => {
                    let app = e.to_app_error();
                    let text =
                        format!("Order sync for {} aborted: {}", pipeline.shop_code(), app);
                    let title = format!(
                        "{} error ({})",
                        app.code.category().name(),
                        app.code.code()
                    );
                    self.notifier
                        .send(
                            &text,
                            &[Attachment::new(title, app.message.clone()).with_color("danger")],
                        )
                        .await;
                    return Err(e);
                }
            }
        }
        Ok(reports)
    }
}

/// Render a run report as a webhook message
fn report_message(report: &RunReport) -> (String, Vec<Attachment>) {
    let text = format!(
        "Order sync for {}: {} fetched, {} new, {} updated, {} labels",
        report.shop_code, report.fetched, report.added, report.updated, report.labels_stored
    );

    let mut attachments = Vec::new();
    if !report.added_order_sns.is_empty() {
        attachments.push(
            Attachment::new("New orders", report.added_order_sns.join(", ")).with_color("good"),
        );
    }
    if !report.label_failures.is_empty() {
        let lines: Vec<String> = report
            .label_failures
            .iter()
            .map(|(sn, msg)| format!("{sn}: {msg}"))
            .collect();
        attachments.push(Attachment::new("Label failures", lines.join("\n")).with_color("danger"));
    }
    if let Some(fulfillment) = &report.fulfillment {
        if !fulfillment.submitted.is_empty() {
            attachments.push(Attachment::new(
                "Warehouse registered",
                fulfillment.submitted.join(", "),
            ));
        }
        if !fulfillment.failures.is_empty() {
            let lines: Vec<String> = fulfillment
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.order_sn, f.message))
                .collect();
            attachments
                .push(Attachment::new("Warehouse failures", lines.join("\n")).with_color("danger"));
        }
    }
    (text, attachments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::SalesOrderSink;
    use crate::label::{LabelStorage, StorageError};
    use crate::ledger::MemorySheet;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shared::{OrderLine, OrderStatus, Recipient};
    use shoal_marketplace::label::{DocumentStatus, LabelTransport};
    use shoal_warehouse::{SalesOrder, SalesOrderAck, WarehouseResult};
    use std::sync::Mutex;
    use std::time::Duration;

    struct FixedOrders(Vec<Order>);

    #[async_trait]
    impl OrderSource for FixedOrders {
        async fn latest_orders(&self, limit: usize, _days_back: i64) -> MarketplaceResult<Vec<Order>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    struct InstantLabels;

    #[async_trait]
    impl LabelTransport for InstantLabels {
        async fn tracking_number(&self, order_sn: &str) -> MarketplaceResult<Option<String>> {
            // orders named U??? never had shipment arranged
            Ok(if order_sn.starts_with('U') {
                None
            } else {
                Some(format!("TRACK-{order_sn}"))
            })
        }

        async fn suggested_document_type(&self, _order_sn: &str) -> MarketplaceResult<String> {
            Ok("THERMAL_AIR_WAYBILL".to_string())
        }

        async fn create_document(
            &self,
            _order_sn: &str,
            _package_number: Option<&str>,
            _document_type: &str,
        ) -> MarketplaceResult<()> {
            Ok(())
        }

        async fn document_status(&self, _order_sn: &str) -> MarketplaceResult<DocumentStatus> {
            Ok(DocumentStatus::Ready)
        }

        async fn download_document(&self, _order_sn: &str) -> MarketplaceResult<Vec<u8>> {
            Ok(b"%PDF-1.4".to_vec())
        }
    }

    #[derive(Default)]
    struct MemoryStorage;

    #[async_trait]
    impl LabelStorage for MemoryStorage {
        async fn store(&self, order_sn: &str, _bytes: &[u8]) -> Result<String, StorageError> {
            Ok(format!("mem://label_{order_sn}.pdf"))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        received: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SalesOrderSink for RecordingSink {
        async fn submit(&self, order: &SalesOrder) -> WarehouseResult<SalesOrderAck> {
            let sn = order
                .attributes
                .iter()
                .find(|a| a.name == "marketplace_order_sn")
                .map(|a| a.value.clone())
                .unwrap_or_default();
            self.received.lock().unwrap().push(sn);
            Ok(SalesOrderAck::default())
        }
    }

    fn shop() -> ShopContext {
        ShopContext::new("SG", "Singapore", 7654321, "token-abc")
    }

    fn order(order_sn: &str, status: OrderStatus) -> Order {
        Order {
            order_sn: order_sn.to_string(),
            status,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 2, 30, 0).unwrap(),
            recipient: Recipient::default(),
            lines: vec![OrderLine {
                product_name: "Ceramic Mug".to_string(),
                sku: "MUG".to_string(),
                variation: String::new(),
                quantity: 1,
                item_price: Decimal::new(1250, 2),
            }],
            total_amount: Decimal::new(1250, 2),
            shipping_fee: Decimal::ZERO,
            currency: "SGD".to_string(),
            payment_method: "Credit Card".to_string(),
            shipping_carrier: "Standard Delivery".to_string(),
            shop_code: "SG".to_string(),
        }
    }

    fn pipeline(
        orders: Vec<Order>,
        sheet: Arc<MemorySheet>,
        sink: Option<Arc<RecordingSink>>,
    ) -> ShopPipeline {
        let labels = LabelWorkflow::new(
            Arc::new(InstantLabels),
            Arc::new(MemoryStorage),
            Duration::from_secs(3),
            Duration::from_secs(30),
        );
        let fulfillment = sink.map(|s| {
            FulfillmentBridge::new(s, shop(), "other", "other", Duration::from_millis(1))
        });
        ShopPipeline::new(
            shop(),
            Arc::new(FixedOrders(orders)),
            OrderLedger::new(sheet, shop()),
            labels,
            fulfillment,
            RunSettings {
                order_limit: 50,
                days_back: 14,
                label_limit: 10,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_reconciles_and_labels() {
        let sheet = Arc::new(MemorySheet::new());
        let pipe = pipeline(
            vec![
                order("X001", OrderStatus::ReadyToShip),
                order("U002", OrderStatus::ReadyToShip),
            ],
            sheet.clone(),
            None,
        );

        let report = pipe.run().await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.added, 2);
        assert_eq!(report.labels_stored, 1);
        assert_eq!(report.labels_skipped, 1);
        assert!(report.label_failures.is_empty());

        let rows = sheet.snapshot().await;
        let labelled = rows.iter().find(|r| r.order_sn == "X001").unwrap();
        assert_eq!(labelled.label_url, "mem://label_X001.pdf");
        let skipped = rows.iter().find(|r| r.order_sn == "U002").unwrap();
        assert_eq!(skipped.label_url, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_cycle_is_quiet() {
        let sheet = Arc::new(MemorySheet::new());
        let orders = vec![order("X001", OrderStatus::ReadyToShip)];
        let pipe = pipeline(orders.clone(), sheet.clone(), None);

        pipe.run().await.unwrap();
        let report = pipe.run().await.unwrap();

        assert_eq!(report.added, 0);
        assert_eq!(report.updated, 0);
        // the label already stuck, so nothing is chased again
        assert_eq!(report.labels_stored, 0);
        assert_eq!(sheet.snapshot().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fulfillment_gets_only_new_awaiting_orders() {
        let sheet = Arc::new(MemorySheet::new());
        let sink = Arc::new(RecordingSink::default());
        let pipe = pipeline(
            vec![
                order("X001", OrderStatus::ReadyToShip),
                order("X002", OrderStatus::Cancelled),
            ],
            sheet.clone(),
            Some(sink.clone()),
        );

        pipe.run().await.unwrap();
        assert_eq!(*sink.received.lock().unwrap(), vec!["X001".to_string()]);

        // the second cycle adds nothing, so nothing is re-submitted
        pipe.run().await.unwrap();
        assert_eq!(sink.received.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_run_error_classification() {
        let e = RunError::Marketplace(MarketplaceError::WindowTooWide { days: 20, max: 15 });
        let app = e.to_app_error();
        assert_eq!(app.code, ErrorCode::WindowTooWide);
        assert_eq!(app.code.category().name(), "marketplace");
        let details = app.details.unwrap();
        assert_eq!(details.get("days").unwrap(), 20);

        let e = RunError::Marketplace(MarketplaceError::Auth("bad signature".to_string()));
        assert_eq!(e.to_app_error().code, ErrorCode::MarketplaceAuth);
    }

    #[test]
    fn test_report_message_flags_failures() {
        let mut report = RunReport {
            shop_code: "SG".to_string(),
            fetched: 3,
            added: 1,
            added_order_sns: vec!["X001".to_string()],
            ..Default::default()
        };
        report
            .label_failures
            .push(("X002".to_string(), "task failed".to_string()));

        let (text, attachments) = report_message(&report);
        assert!(text.contains("Order sync for SG"));
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[1].color.as_deref(), Some("danger"));
        assert!(!report.is_clean());
    }
}
