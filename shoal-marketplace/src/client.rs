//! Signed HTTP client for the marketplace order API

use crate::config::{MarketplaceConfig, MAX_WINDOW_DAYS};
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::sign;
use crate::types::{Envelope, OrderDetailResponse, OrderListResponse, OrderSummary};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{Order, ShopContext};

/// Upstream error codes that indicate a token/signature problem
const AUTH_ERROR_CODES: &[&str] = &["error_auth", "error_sign", "invalid_access_token"];

/// Client for one shop's slice of the marketplace API
///
/// Owns its [`ShopContext`]; nothing is looked up from a global registry.
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    client: Client,
    config: MarketplaceConfig,
    shop: ShopContext,
}

impl MarketplaceClient {
    /// Create a new client for the given shop
    pub fn new(config: MarketplaceConfig, shop: ShopContext) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            config,
            shop,
        }
    }

    /// The shop this client is bound to
    pub fn shop(&self) -> &ShopContext {
        &self.shop
    }

    /// Configured inter-request pause
    pub fn request_pause(&self) -> std::time::Duration {
        self.config.request_pause
    }

    /// Build the signed authentication query for `path` at `timestamp`
    pub(crate) fn signed_query_at(&self, path: &str, timestamp: i64) -> Vec<(String, String)> {
        let signature = sign::sign(
            &self.config.partner_key,
            self.config.partner_id,
            path,
            timestamp,
            &self.shop.access_token,
            self.shop.shop_id,
        );
        vec![
            ("partner_id".to_string(), self.config.partner_id.to_string()),
            ("timestamp".to_string(), timestamp.to_string()),
            ("access_token".to_string(), self.shop.access_token.clone()),
            ("shop_id".to_string(), self.shop.shop_id.to_string()),
            ("sign".to_string(), signature),
        ]
    }

    fn signed_query(&self, path: &str) -> Vec<(String, String)> {
        self.signed_query_at(path, Utc::now().timestamp())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Make a signed GET request and unwrap the response envelope
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> MarketplaceResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .query(&self.signed_query(path))
            .query(query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Make a signed POST request with a JSON body and unwrap the envelope
    pub(crate) async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> MarketplaceResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .query(&self.signed_query(path))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Raw signed POST, for endpoints that may answer with a binary body
    pub(crate) async fn post_raw<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> MarketplaceResult<reqwest::Response> {
        let response = self
            .client
            .post(self.url(path))
            .query(&self.signed_query(path))
            .json(body)
            .send()
            .await?;
        Ok(response)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> MarketplaceResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(MarketplaceError::Auth(text))
                }
                _ => Err(MarketplaceError::Api {
                    code: format!("http_{}", status.as_u16()),
                    message: text,
                }),
            };
        }

        let envelope: Envelope<T> = response.json().await?;
        Self::unwrap_envelope(envelope)
    }

    pub(crate) fn unwrap_envelope<T>(envelope: Envelope<T>) -> MarketplaceResult<T> {
        if !envelope.error.is_empty() {
            if AUTH_ERROR_CODES.contains(&envelope.error.as_str()) {
                return Err(MarketplaceError::Auth(envelope.message));
            }
            return Err(MarketplaceError::Api {
                code: envelope.error,
                message: envelope.message,
            });
        }
        envelope.response.ok_or_else(|| {
            MarketplaceError::InvalidResponse(format!(
                "missing response body (request_id {})",
                envelope.request_id
            ))
        })
    }

    // ========== Order API ==========

    /// List order summaries created inside `[time_from, time_to]`
    ///
    /// Single paged request. The upstream enforces a window of at most
    /// fifteen days; wider windows are rejected client-side before any
    /// network call.
    pub async fn list_orders(
        &self,
        time_from: DateTime<Utc>,
        time_to: DateTime<Utc>,
        page_size: u32,
    ) -> MarketplaceResult<Vec<OrderSummary>> {
        validate_window(time_from, time_to)?;
        let page_size = page_size.min(self.config.page_size);

        let response: OrderListResponse = self
            .get(
                "/api/v2/order/get_order_list",
                &[
                    ("time_range_field", "create_time".to_string()),
                    ("time_from", time_from.timestamp().to_string()),
                    ("time_to", time_to.timestamp().to_string()),
                    ("page_size", page_size.to_string()),
                ],
            )
            .await?;

        Ok(response.order_list)
    }

    /// Fetch full line-item and financial detail for one order
    pub async fn order_detail(&self, order_sn: &str) -> MarketplaceResult<Order> {
        let response: OrderDetailResponse = self
            .get(
                "/api/v2/order/get_order_detail",
                &[
                    ("order_sn_list", order_sn.to_string()),
                    (
                        "response_optional_fields",
                        "item_list,recipient_address,total_amount,actual_shipping_fee,\
                         payment_method,shipping_carrier"
                            .to_string(),
                    ),
                ],
            )
            .await?;

        response
            .order_list
            .into_iter()
            .next()
            .map(|detail| detail.into_order(&self.shop.code))
            .ok_or_else(|| MarketplaceError::InvalidResponse(format!("order {order_sn} not in detail response")))
    }

    /// Fetch the most recent orders with full detail
    ///
    /// Composes a list request with up to `limit` detail fetches, pausing
    /// between detail calls to respect the upstream rate ceiling. A failed
    /// detail fetch is logged and skipped; a partial result is expected.
    pub async fn latest_orders(&self, limit: usize, days_back: i64) -> MarketplaceResult<Vec<Order>> {
        let days_back = if days_back > MAX_WINDOW_DAYS {
            tracing::warn!(
                shop = %self.shop.code,
                requested = days_back,
                clamped = MAX_WINDOW_DAYS,
                "days_back exceeds the API window, clamping"
            );
            MAX_WINDOW_DAYS
        } else {
            days_back.max(1)
        };

        let time_to = Utc::now();
        let time_from = time_to - chrono::Duration::days(days_back);
        let summaries = self
            .list_orders(time_from, time_to, self.config.page_size)
            .await?;

        let mut orders = Vec::new();
        for summary in summaries.into_iter().take(limit) {
            tokio::time::sleep(self.config.request_pause).await;
            match self.order_detail(&summary.order_sn).await {
                Ok(order) => orders.push(order),
                Err(e) => {
                    // partial batch is acceptable; the order is retried next run
                    tracing::warn!(
                        shop = %self.shop.code,
                        order_sn = %summary.order_sn,
                        error = %e,
                        "Failed to fetch order detail, skipping"
                    );
                }
            }
        }

        tracing::info!(
            shop = %self.shop.code,
            count = orders.len(),
            "Fetched latest orders"
        );
        Ok(orders)
    }
}

/// Validate the order-list time window against the upstream maximum
///
/// The full span counts, not whole days: fifteen days plus an hour is
/// already over the limit.
fn validate_window(time_from: DateTime<Utc>, time_to: DateTime<Utc>) -> MarketplaceResult<()> {
    let window = time_to - time_from;
    if window > chrono::Duration::days(MAX_WINDOW_DAYS) {
        // round partial days up so the reported span matches the rejection
        let days = (window.num_seconds() + 86_399) / 86_400;
        return Err(MarketplaceError::WindowTooWide {
            days,
            max: MAX_WINDOW_DAYS,
        });
    }
    Ok(())
}
