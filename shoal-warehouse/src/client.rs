//! Bearer-token REST client for the warehouse API

use crate::error::{WarehouseError, WarehouseResult};
use crate::types::{SalesOrder, SalesOrderAck, SalesOrderRequest, WarehouseErrorBody};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Seam for obtaining a fresh access token after a 401
///
/// Token storage and refresh scheduling are external concerns; the client
/// only needs "give me a new token, once".
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn refresh(&self) -> WarehouseResult<String>;
}

/// A provider that always hands out the same token
///
/// Useful for tests and for deployments where tokens rotate out-of-band.
pub struct StaticTokenProvider(pub String);

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn refresh(&self) -> WarehouseResult<String> {
        Ok(self.0.clone())
    }
}

/// What the client needs from one HTTP exchange
#[derive(Debug, Clone)]
pub struct WireReply {
    pub status: StatusCode,
    /// Rate-limit reset moment, when the server sent one
    pub rate_limit_reset: Option<DateTime<Utc>>,
    pub body: String,
}

/// Request seam for the sales-order endpoint
///
/// Implemented by [`HttpTransport`]; the client depends on this trait so the
/// refresh-and-retry sequencing can be exercised without a network.
#[async_trait]
pub trait WarehouseTransport: Send + Sync {
    async fn post_sales_order(
        &self,
        token: &str,
        body: &SalesOrderRequest,
    ) -> WarehouseResult<WireReply>;
}

/// The real transport
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl WarehouseTransport for HttpTransport {
    async fn post_sales_order(
        &self,
        token: &str,
        body: &SalesOrderRequest,
    ) -> WarehouseResult<WireReply> {
        let response = self
            .client
            .post(self.url("sales_orders/new"))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let rate_limit_reset = parse_reset(&response);
        let body = response.text().await.unwrap_or_default();
        Ok(WireReply {
            status,
            rate_limit_reset,
            body,
        })
    }
}

/// Client for the warehouse management API
pub struct WarehouseClient {
    transport: Arc<dyn WarehouseTransport>,
    token: RwLock<String>,
    provider: Arc<dyn TokenProvider>,
}

impl WarehouseClient {
    /// Create a new client with an initial token and refresh provider
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(base_url)), token, provider)
    }

    /// Create a client over an explicit transport
    pub fn with_transport(
        transport: Arc<dyn WarehouseTransport>,
        token: impl Into<String>,
        provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            transport,
            token: RwLock::new(token.into()),
            provider,
        }
    }

    /// Register a sales order
    ///
    /// A 401 triggers exactly one token refresh and one retry; a second 401
    /// propagates as an authentication error.
    pub async fn create_sales_order(&self, order: &SalesOrder) -> WarehouseResult<SalesOrderAck> {
        let body = SalesOrderRequest {
            sales_order: order.clone(),
        };

        let token = self.token.read().await.clone();
        let reply = self.transport.post_sales_order(&token, &body).await?;
        if reply.status != StatusCode::UNAUTHORIZED {
            return Self::handle_reply(reply);
        }

        tracing::info!("Warehouse token rejected, refreshing once");
        let fresh = self.provider.refresh().await?;
        *self.token.write().await = fresh.clone();

        let retry = self.transport.post_sales_order(&fresh, &body).await?;
        if retry.status == StatusCode::UNAUTHORIZED {
            return Err(WarehouseError::Auth(retry.body));
        }
        Self::handle_reply(retry)
    }

    fn handle_reply(reply: WireReply) -> WarehouseResult<SalesOrderAck> {
        if reply.status == StatusCode::TOO_MANY_REQUESTS {
            return Err(WarehouseError::RateLimited {
                reset_at: reply.rate_limit_reset,
            });
        }

        if !reply.status.is_success() {
            let body: WarehouseErrorBody = serde_json::from_str(&reply.body).unwrap_or_default();
            let message = if body.message.is_empty() {
                reply.body
            } else {
                body.message.clone()
            };

            if body.is_duplicate() {
                return Err(WarehouseError::Duplicate(message));
            }
            return match reply.status {
                StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                    Err(WarehouseError::Validation(message))
                }
                _ => Err(WarehouseError::Api {
                    status: reply.status.as_u16(),
                    message,
                }),
            };
        }

        if reply.body.trim().is_empty() {
            return Ok(SalesOrderAck::default());
        }
        serde_json::from_str(&reply.body)
            .map_err(|e| WarehouseError::InvalidResponse(e.to_string()))
    }
}

/// Parse the rate-limit reset moment from response headers
///
/// `X-RateLimit-Reset` carries a unix timestamp; `Retry-After` a delta in
/// seconds. Either is acceptable; absence leaves the caller to back off
/// blindly.
fn parse_reset(response: &reqwest::Response) -> Option<DateTime<Utc>> {
    if let Some(ts) = header_i64(response, "x-ratelimit-reset") {
        return Utc.timestamp_opt(ts, 0).single();
    }
    if let Some(secs) = header_i64(response, "retry-after") {
        return Some(Utc::now() + chrono::Duration::seconds(secs));
    }
    None
}

fn header_i64(response: &reqwest::Response, name: &str) -> Option<i64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}
