//! Fulfillment bridge
//!
//! Converts marketplace orders into warehouse sales-order payloads and
//! submits them one by one. Payment methods and carriers go through fixed
//! mapping tables with a configured fallback; SKUs come from the ledger rows
//! (which an operator may have corrected by hand) rather than straight from
//! the marketplace. One order's rejection never aborts its siblings.

use async_trait::async_trait;
use shared::{LedgerRow, Order, ShopContext};
use shoal_warehouse::{
    OrderAttribute, SalesOrder, SalesOrderAck, SalesOrderLine, WarehouseClient, WarehouseError,
    WarehouseResult,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Submission seam
///
/// Implemented by [`WarehouseClient`]; the bridge depends on this trait so
/// batch behavior can be exercised without a network.
#[async_trait]
pub trait SalesOrderSink: Send + Sync {
    async fn submit(&self, order: &SalesOrder) -> WarehouseResult<SalesOrderAck>;
}

#[async_trait]
impl SalesOrderSink for WarehouseClient {
    async fn submit(&self, order: &SalesOrder) -> WarehouseResult<SalesOrderAck> {
        self.create_sales_order(order).await
    }
}

/// One order that could not be registered
#[derive(Debug, Clone)]
pub struct FulfillmentFailure {
    pub order_sn: String,
    pub message: String,
}

/// Outcome of one submission batch
#[derive(Debug, Default)]
pub struct FulfillmentReport {
    /// Orders the warehouse accepted
    pub submitted: Vec<String>,
    /// Orders the warehouse already knew about
    pub duplicates: Vec<String>,
    /// Per-order failures; the batch continued past each of these
    pub failures: Vec<FulfillmentFailure>,
    /// Set when a rate limit cut the batch short, with the reset moment
    pub rate_limited: Option<String>,
}

impl FulfillmentReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.rate_limited.is_none()
    }
}

/// Bridges marketplace orders into the warehouse system for one shop
pub struct FulfillmentBridge {
    sink: Arc<dyn SalesOrderSink>,
    shop: ShopContext,
    payment_map: HashMap<&'static str, &'static str>,
    carrier_map: HashMap<&'static str, &'static str>,
    default_payment_method: String,
    default_carrier: String,
    submit_pause: Duration,
}

impl FulfillmentBridge {
    pub fn new(
        sink: Arc<dyn SalesOrderSink>,
        shop: ShopContext,
        default_payment_method: impl Into<String>,
        default_carrier: impl Into<String>,
        submit_pause: Duration,
    ) -> Self {
        Self {
            sink,
            shop,
            payment_map: payment_map(),
            carrier_map: carrier_map(),
            default_payment_method: default_payment_method.into(),
            default_carrier: default_carrier.into(),
            submit_pause,
        }
    }

    /// Build the warehouse payload for one order
    ///
    /// `ledger_rows` are this order's rows in sheet order; a non-empty SKU
    /// there overrides the marketplace SKU for the matching line.
    pub fn build_payload(&self, order: &Order, ledger_rows: &[LedgerRow]) -> SalesOrder {
        let lines = order
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let ledger_sku = ledger_rows.get(i).map(|r| r.sku.as_str()).unwrap_or("");
                let sku = if ledger_sku.is_empty() {
                    line.sku.clone()
                } else {
                    ledger_sku.to_string()
                };
                let (v1, v2) = line.variation_pair();
                let option = if v2.is_empty() { v1 } else { format!("{v1} {v2}") };
                SalesOrderLine {
                    sku,
                    name: line.product_name.clone(),
                    price: line.item_price,
                    quantity: line.quantity,
                    option,
                }
            })
            .collect();

        SalesOrder {
            customer_name: order.recipient.name.clone(),
            phone: order.recipient.phone.clone(),
            address: order.recipient.full_address.clone(),
            zipcode: order.recipient.zipcode.clone(),
            payment_method: self
                .payment_map
                .get(order.payment_method.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| self.default_payment_method.clone()),
            carrier: self
                .carrier_map
                .get(order.shipping_carrier.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| self.default_carrier.clone()),
            ordered_at: order
                .created_at
                .with_timezone(&self.shop.timezone)
                .format("%Y-%m-%d")
                .to_string(),
            lines,
            attributes: vec![
                OrderAttribute::new("marketplace_order_sn", order.order_sn.clone()),
                OrderAttribute::new("marketplace_shop", self.shop.code.clone()),
                OrderAttribute::new("marketplace_status", order.status.code()),
            ],
        }
    }

    /// Submit a batch sequentially with the configured inter-call pause
    ///
    /// Rejections are collected per order; only a rate limit stops the batch
    /// early, since every further call would bounce off the same limit.
    pub async fn submit_batch(&self, batch: &[(Order, Vec<LedgerRow>)]) -> FulfillmentReport {
        let mut report = FulfillmentReport::default();

        for (i, (order, rows)) in batch.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.submit_pause).await;
            }

            let payload = self.build_payload(order, rows);
            match self.sink.submit(&payload).await {
                Ok(ack) => {
                    tracing::info!(
                        shop = %self.shop.code,
                        order_sn = %order.order_sn,
                        warehouse_id = ?ack.id,
                        "Sales order registered"
                    );
                    report.submitted.push(order.order_sn.clone());
                }
                Err(WarehouseError::Duplicate(raw)) => {
                    tracing::info!(
                        shop = %self.shop.code,
                        order_sn = %order.order_sn,
                        upstream = %raw,
                        "Sales order already registered"
                    );
                    report.duplicates.push(order.order_sn.clone());
                    report.failures.push(FulfillmentFailure {
                        order_sn: order.order_sn.clone(),
                        message: format!(
                            "order {} is already registered in the warehouse",
                            order.order_sn
                        ),
                    });
                }
                Err(e @ WarehouseError::RateLimited { .. }) => {
                    let detail = e.to_string();
                    tracing::warn!(
                        shop = %self.shop.code,
                        order_sn = %order.order_sn,
                        %detail,
                        "Rate limited, stopping batch"
                    );
                    report.rate_limited = Some(detail);
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        shop = %self.shop.code,
                        order_sn = %order.order_sn,
                        error = %e,
                        "Sales order rejected"
                    );
                    report.failures.push(FulfillmentFailure {
                        order_sn: order.order_sn.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        report
    }
}

/// Marketplace payment-method strings to warehouse codes
fn payment_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("Credit Card", "credit_card"),
        ("Credit/Debit Card", "credit_card"),
        ("Cash on Delivery", "cod"),
        ("Bank Transfer", "bank_transfer"),
        ("ShopeePay", "wallet"),
        ("Wallet", "wallet"),
    ])
}

/// Marketplace carrier strings to warehouse codes
fn carrier_map() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("Standard Delivery", "standard"),
        ("Economy Delivery", "economy"),
        ("Express Delivery", "express"),
        ("Self Collection", "pickup"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shared::{OrderLine, OrderStatus, Recipient};
    use std::sync::Mutex;

    struct ScriptedSink {
        // one scripted result per call, in order; Ok(()) means accept
        script: Mutex<Vec<Result<(), WarehouseError>>>,
        received: Mutex<Vec<SalesOrder>>,
    }

    impl ScriptedSink {
        fn accepting(n: usize) -> Self {
            Self {
                script: Mutex::new((0..n).map(|_| Ok(())).collect()),
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SalesOrderSink for ScriptedSink {
        async fn submit(&self, order: &SalesOrder) -> WarehouseResult<SalesOrderAck> {
            self.received.lock().unwrap().push(order.clone());
            let mut script = self.script.lock().unwrap();
            match script.remove(0) {
                Ok(()) => Ok(SalesOrderAck {
                    id: Some(1),
                    message: String::new(),
                }),
                Err(e) => Err(e),
            }
        }
    }

    fn shop() -> ShopContext {
        ShopContext::new("SG", "Singapore", 7654321, "token-abc")
    }

    fn order(order_sn: &str) -> Order {
        Order {
            order_sn: order_sn.to_string(),
            status: OrderStatus::ReadyToShip,
            created_at: Utc.with_ymd_and_hms(2026, 7, 31, 18, 0, 0).unwrap(),
            recipient: Recipient {
                name: "A. Buyer".to_string(),
                phone: "+6590000000".to_string(),
                full_address: "1 Example Way, Singapore".to_string(),
                city: "Singapore".to_string(),
                state: String::new(),
                zipcode: "238801".to_string(),
            },
            lines: vec![OrderLine {
                product_name: "Ceramic Mug".to_string(),
                sku: "MUG-UP".to_string(),
                variation: "Red,Large".to_string(),
                quantity: 2,
                item_price: Decimal::new(1250, 2),
            }],
            total_amount: Decimal::new(2500, 2),
            shipping_fee: Decimal::new(350, 2),
            currency: "SGD".to_string(),
            payment_method: "Credit Card".to_string(),
            shipping_carrier: "Standard Delivery".to_string(),
            shop_code: "SG".to_string(),
        }
    }

    fn bridge(sink: Arc<dyn SalesOrderSink>) -> FulfillmentBridge {
        FulfillmentBridge::new(sink, shop(), "other", "other", Duration::from_millis(500))
    }

    #[test]
    fn test_payload_maps_payment_and_carrier() {
        let bridge = bridge(Arc::new(ScriptedSink::accepting(0)));
        let payload = bridge.build_payload(&order("X001"), &[]);

        assert_eq!(payload.payment_method, "credit_card");
        assert_eq!(payload.carrier, "standard");
        assert_eq!(payload.customer_name, "A. Buyer");
        assert_eq!(payload.lines[0].option, "Red Large");
        // UTC 2026-07-31 18:00 is already 2026-08-01 in the shop timezone
        assert_eq!(payload.ordered_at, "2026-08-01");
        assert_eq!(payload.attributes[0].value, "X001");
        assert_eq!(payload.attributes[1].value, "SG");
        assert_eq!(payload.attributes[2].value, "READY_TO_SHIP");
    }

    #[test]
    fn test_payload_falls_back_to_default_codes() {
        let bridge = bridge(Arc::new(ScriptedSink::accepting(0)));
        let mut o = order("X001");
        o.payment_method = "Mystery Pay".to_string();
        o.shipping_carrier = "Pigeon Post".to_string();

        let payload = bridge.build_payload(&o, &[]);
        assert_eq!(payload.payment_method, "other");
        assert_eq!(payload.carrier, "other");
    }

    #[test]
    fn test_payload_prefers_ledger_sku() {
        let bridge = bridge(Arc::new(ScriptedSink::accepting(0)));
        let mut row = LedgerRow::default();
        row.order_sn = "X001".to_string();
        row.sku = "MUG-CORRECTED".to_string();

        let payload = bridge.build_payload(&order("X001"), &[row]);
        assert_eq!(payload.lines[0].sku, "MUG-CORRECTED");

        // empty ledger SKU keeps the upstream one
        let mut row = LedgerRow::default();
        row.order_sn = "X001".to_string();
        let payload = bridge.build_payload(&order("X001"), &[row]);
        assert_eq!(payload.lines[0].sku, "MUG-UP");
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_collects_failures_and_continues() {
        let sink = Arc::new(ScriptedSink {
            script: Mutex::new(vec![
                Ok(()),
                Err(WarehouseError::Validation("zipcode is required".to_string())),
                Ok(()),
            ]),
            received: Mutex::new(Vec::new()),
        });
        let bridge = bridge(sink.clone());

        let batch = vec![
            (order("X001"), Vec::new()),
            (order("X002"), Vec::new()),
            (order("X003"), Vec::new()),
        ];
        let report = bridge.submit_batch(&batch).await;

        assert_eq!(report.submitted, vec!["X001", "X003"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].order_sn, "X002");
        assert!(report.failures[0].message.contains("zipcode"));
        assert_eq!(sink.received.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_is_translated() {
        let sink = Arc::new(ScriptedSink {
            script: Mutex::new(vec![Err(WarehouseError::Duplicate(
                "ERR_DUP_SO_20421: duplicate key".to_string(),
            ))]),
            received: Mutex::new(Vec::new()),
        });
        let bridge = bridge(sink);

        let report = bridge.submit_batch(&[(order("X001"), Vec::new())]).await;

        assert_eq!(report.duplicates, vec!["X001"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].message,
            "order X001 is already registered in the warehouse"
        );
        assert!(!report.failures[0].message.contains("ERR_DUP_SO_20421"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_stops_the_batch() {
        let sink = Arc::new(ScriptedSink {
            script: Mutex::new(vec![
                Ok(()),
                Err(WarehouseError::RateLimited { reset_at: None }),
                Ok(()),
            ]),
            received: Mutex::new(Vec::new()),
        });
        let bridge = bridge(sink.clone());

        let batch = vec![
            (order("X001"), Vec::new()),
            (order("X002"), Vec::new()),
            (order("X003"), Vec::new()),
        ];
        let report = bridge.submit_batch(&batch).await;

        assert_eq!(report.submitted, vec!["X001"]);
        assert!(report.rate_limited.is_some());
        // X003 was never attempted
        assert_eq!(sink.received.lock().unwrap().len(), 2);
    }
}
