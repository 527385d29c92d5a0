//! Wire types for the marketplace API

use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{Order, OrderLine, OrderStatus, Recipient};

/// Common response envelope
///
/// A non-empty `error` field signals an API-level failure independent of the
/// HTTP status.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    pub response: Option<T>,
}

/// Order-list page
#[derive(Debug, Default, Deserialize)]
pub struct OrderListResponse {
    #[serde(default)]
    pub order_list: Vec<OrderSummary>,
    #[serde(default)]
    pub more: bool,
}

/// Order summary from the list endpoint
///
/// The list endpoint returns identifiers and coarse status only; line items
/// and financials require a detail fetch.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrderSummary {
    pub order_sn: String,
    #[serde(default)]
    pub order_status: String,
}

/// Order-detail payload
#[derive(Debug, Default, Deserialize)]
pub struct OrderDetailResponse {
    #[serde(default)]
    pub order_list: Vec<OrderDetail>,
}

/// Full order detail as sent upstream
#[derive(Debug, Deserialize)]
pub struct OrderDetail {
    pub order_sn: String,
    #[serde(default)]
    pub order_status: String,
    /// Unix timestamp of order creation
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub total_amount: Decimal,
    /// Fee actually charged; absent until the parcel is weighed
    pub actual_shipping_fee: Option<Decimal>,
    pub estimated_shipping_fee: Option<Decimal>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub shipping_carrier: String,
    pub recipient_address: Option<RecipientAddress>,
    #[serde(default)]
    pub item_list: Vec<OrderItem>,
}

/// Recipient block of the detail payload
#[derive(Debug, Default, Deserialize)]
pub struct RecipientAddress {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub full_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zipcode: String,
}

/// One purchased item of the detail payload
#[derive(Debug, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub item_name: String,
    #[serde(default)]
    pub item_sku: String,
    /// Variation descriptor, e.g. "Red,Large"
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub model_sku: String,
    #[serde(default)]
    pub model_quantity_purchased: u32,
    #[serde(default)]
    pub model_discounted_price: Decimal,
}

impl OrderDetail {
    /// Convert the wire detail into the domain order
    pub fn into_order(self, shop_code: &str) -> Order {
        let recipient = self.recipient_address.unwrap_or_default();
        let shipping_fee = self
            .actual_shipping_fee
            .or(self.estimated_shipping_fee)
            .unwrap_or_default();

        Order {
            order_sn: self.order_sn,
            status: OrderStatus::from_code(&self.order_status),
            created_at: DateTime::from_timestamp(self.create_time, 0)
                .unwrap_or(DateTime::UNIX_EPOCH),
            recipient: Recipient {
                name: recipient.name,
                phone: recipient.phone,
                full_address: recipient.full_address,
                city: recipient.city,
                state: recipient.state,
                zipcode: recipient.zipcode,
            },
            lines: self
                .item_list
                .into_iter()
                .map(|item| OrderLine {
                    product_name: item.item_name,
                    // a model-level SKU overrides the listing-level one
                    sku: if item.model_sku.is_empty() {
                        item.item_sku
                    } else {
                        item.model_sku
                    },
                    variation: item.model_name,
                    quantity: item.model_quantity_purchased,
                    item_price: item.model_discounted_price,
                })
                .collect(),
            total_amount: self.total_amount,
            shipping_fee,
            currency: self.currency,
            payment_method: self.payment_method,
            shipping_carrier: self.shipping_carrier,
            shop_code: shop_code.to_string(),
        }
    }
}

// ==================== Shipping document wire types ====================

#[derive(Debug, Default, Deserialize)]
pub struct TrackingNumberResponse {
    #[serde(default)]
    pub tracking_number: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentParameterResponse {
    #[serde(default)]
    pub result_list: Vec<DocumentParameter>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentParameter {
    #[serde(default)]
    pub suggest_shipping_document_type: String,
}

/// Body of `create_shipping_document`
#[derive(Debug, Serialize)]
pub struct CreateDocumentRequest {
    pub order_list: Vec<CreateDocumentOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_document_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateDocumentOrder {
    pub order_sn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentResultResponse {
    #[serde(default)]
    pub result_list: Vec<DocumentResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DocumentResult {
    #[serde(default)]
    pub order_sn: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub fail_message: String,
}

/// Body shared by the status-poll and download endpoints
#[derive(Debug, Serialize)]
pub struct DocumentQueryRequest {
    pub order_list: Vec<CreateDocumentOrder>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_conversion() {
        let json = r#"{
            "order_sn": "X001",
            "order_status": "READY_TO_SHIP",
            "create_time": 1755000000,
            "currency": "SGD",
            "total_amount": 50.00,
            "actual_shipping_fee": 3.50,
            "payment_method": "Credit Card",
            "shipping_carrier": "Standard Delivery",
            "recipient_address": {
                "name": "A. Buyer",
                "phone": "+6590000000",
                "full_address": "1 Example Way",
                "city": "Singapore",
                "state": "",
                "zipcode": "238801"
            },
            "item_list": [
                {
                    "item_name": "Ceramic Mug",
                    "item_sku": "MUG",
                    "model_name": "Red,Large",
                    "model_sku": "MUG-RED-L",
                    "model_quantity_purchased": 2,
                    "model_discounted_price": 12.50
                }
            ]
        }"#;

        let detail: OrderDetail = serde_json::from_str(json).unwrap();
        let order = detail.into_order("SG");

        assert_eq!(order.order_sn, "X001");
        assert_eq!(order.status, shared::OrderStatus::ReadyToShip);
        assert_eq!(order.shop_code, "SG");
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].sku, "MUG-RED-L");
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(order.total_amount, Decimal::new(5000, 2));
        assert_eq!(order.shipping_fee, Decimal::new(350, 2));
    }

    #[test]
    fn test_detail_falls_back_to_item_sku_and_estimated_fee() {
        let json = r#"{
            "order_sn": "X002",
            "order_status": "PROCESSED",
            "create_time": 1755000000,
            "estimated_shipping_fee": 2.00,
            "item_list": [
                {"item_name": "Coaster", "item_sku": "CST-01", "model_quantity_purchased": 1}
            ]
        }"#;

        let order: Order = serde_json::from_str::<OrderDetail>(json)
            .unwrap()
            .into_order("SG");
        assert_eq!(order.lines[0].sku, "CST-01");
        assert_eq!(order.shipping_fee, Decimal::new(200, 2));
        assert_eq!(order.recipient, Recipient::default());
    }

    #[test]
    fn test_envelope_error_field() {
        let json = r#"{"request_id": "r1", "error": "error_param", "message": "bad window"}"#;
        let envelope: Envelope<OrderListResponse> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.error, "error_param");
        assert!(envelope.response.is_none());
    }

    #[test]
    fn test_create_document_request_shape() {
        let request = CreateDocumentRequest {
            order_list: vec![CreateDocumentOrder {
                order_sn: "X001".to_string(),
                package_number: None,
            }],
            shipping_document_type: Some("THERMAL_AIR_WAYBILL".to_string()),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"order_sn\":\"X001\""));
        assert!(!json.contains("package_number"));
        assert!(json.contains("\"shipping_document_type\":\"THERMAL_AIR_WAYBILL\""));
    }
}
