//! Marketplace client configuration

use std::time::Duration;

/// Hard upstream limit on the order-list page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Hard upstream limit on the order-list time window, in days
pub const MAX_WINDOW_DAYS: i64 = 15;

/// Configuration for connecting to the marketplace API
///
/// Partner-level values shared by every shop; the shop-scoped credentials
/// live in [`shared::ShopContext`].
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// API base URL (e.g. "https://partner.marketplace.example")
    pub base_url: String,

    /// Partner identifier issued by the marketplace
    pub partner_id: u64,

    /// Partner secret used to sign every request
    pub partner_key: String,

    /// Page size for order-list requests (clamped to [`MAX_PAGE_SIZE`])
    pub page_size: u32,

    /// Pause between consecutive requests, the upstream rate ceiling
    pub request_pause: Duration,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl MarketplaceConfig {
    /// Create a new configuration with defaults
    pub fn new(base_url: impl Into<String>, partner_id: u64, partner_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            partner_id,
            partner_key: partner_key.into(),
            page_size: MAX_PAGE_SIZE,
            request_pause: Duration::from_secs(1),
            timeout: 30,
        }
    }

    /// Set the order-list page size (values above the upstream cap are clamped)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.min(MAX_PAGE_SIZE);
        self
    }

    /// Set the inter-request pause
    ///
    /// Must stay at or above the upstream minimum inter-request interval;
    /// tunable against quota rather than hard-coded.
    pub fn with_request_pause(mut self, pause: Duration) -> Self {
        self.request_pause = pause;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}
