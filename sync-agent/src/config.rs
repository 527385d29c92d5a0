//! Sync agent configuration
//!
//! All configuration is explicit: built once at process start from
//! environment variables (plus a JSON shops file) and threaded through
//! constructors. Nothing consults an ambient/global registry.

use chrono_tz::Tz;
use serde::Deserialize;
use shared::ShopContext;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Sync agent configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,

    // ---- marketplace ----
    /// Marketplace API base URL
    pub marketplace_base_url: String,
    /// Partner identifier (env: SHOAL_PARTNER_ID)
    pub partner_id: u64,
    /// Partner signing secret (env: SHOAL_PARTNER_KEY)
    pub partner_key: String,
    /// Pause between marketplace requests, milliseconds
    pub request_pause_ms: u64,

    // ---- shops ----
    /// Path to the shops JSON file (env: SHOAL_SHOPS_FILE)
    pub shops_file: String,

    // ---- ledger sheet ----
    /// Sheet API base URL
    pub sheet_base_url: String,
    /// Spreadsheet identifier holding one tab per shop
    pub spreadsheet_id: String,
    /// Bearer token for the sheet API
    pub sheet_token: String,

    // ---- label workflow ----
    /// Poll interval for document tasks, seconds
    pub label_poll_secs: u64,
    /// Maximum wait for a document task, seconds
    pub label_max_wait_secs: u64,
    /// Maximum label workflows per shop per run
    pub label_limit: usize,
    /// Directory where downloaded labels are stored
    pub label_dir: String,

    // ---- order fetch ----
    /// Maximum orders fetched per shop per run
    pub order_limit: usize,
    /// Look-back window in days (clamped to the API maximum)
    pub days_back: i64,

    // ---- warehouse ----
    /// Warehouse API base URL
    pub warehouse_base_url: String,
    /// Warehouse bearer token (env: SHOAL_WAREHOUSE_TOKEN)
    pub warehouse_token: String,
    /// Whether new orders are forwarded to the warehouse
    pub fulfillment_enabled: bool,
    /// Pause between warehouse submissions, milliseconds
    pub submit_pause_ms: u64,
    /// Warehouse payment-method code used when no mapping matches
    pub default_payment_method: String,
    /// Warehouse carrier code used when no mapping matches
    pub default_carrier: String,

    // ---- notification ----
    /// Webhook URL for run notifications; absent disables notifications
    pub webhook_url: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            marketplace_base_url: std::env::var("SHOAL_MARKETPLACE_URL")
                .unwrap_or_else(|_| "https://partner.shopeemobile.com".into()),
            partner_id: std::env::var("SHOAL_PARTNER_ID")
                .map_err(|_| "SHOAL_PARTNER_ID must be set")?
                .parse()
                .map_err(|_| "SHOAL_PARTNER_ID must be numeric")?,
            partner_key: Self::require_secret("SHOAL_PARTNER_KEY", &environment)?,
            request_pause_ms: env_parse("SHOAL_REQUEST_PAUSE_MS", 1000),
            shops_file: std::env::var("SHOAL_SHOPS_FILE").unwrap_or_else(|_| "shops.json".into()),
            sheet_base_url: std::env::var("SHOAL_SHEET_URL")
                .unwrap_or_else(|_| "https://sheets.googleapis.com".into()),
            spreadsheet_id: std::env::var("SHOAL_SPREADSHEET_ID")
                .map_err(|_| "SHOAL_SPREADSHEET_ID must be set")?,
            sheet_token: Self::require_secret("SHOAL_SHEET_TOKEN", &environment)?,
            label_poll_secs: env_parse("SHOAL_LABEL_POLL_SECS", 3),
            label_max_wait_secs: env_parse("SHOAL_LABEL_MAX_WAIT_SECS", 30),
            label_limit: env_parse("SHOAL_LABEL_LIMIT", 10),
            label_dir: std::env::var("SHOAL_LABEL_DIR").unwrap_or_else(|_| "labels".into()),
            order_limit: env_parse("SHOAL_ORDER_LIMIT", 50),
            days_back: env_parse("SHOAL_DAYS_BACK", 14),
            warehouse_base_url: std::env::var("SHOAL_WAREHOUSE_URL")
                .unwrap_or_else(|_| "https://wms.example.com/api".into()),
            warehouse_token: Self::require_secret("SHOAL_WAREHOUSE_TOKEN", &environment)?,
            fulfillment_enabled: std::env::var("SHOAL_FULFILLMENT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            submit_pause_ms: env_parse("SHOAL_SUBMIT_PAUSE_MS", 500),
            default_payment_method: std::env::var("SHOAL_DEFAULT_PAYMENT_METHOD")
                .unwrap_or_else(|_| "other".into()),
            default_carrier: std::env::var("SHOAL_DEFAULT_CARRIER")
                .unwrap_or_else(|_| "other".into()),
            webhook_url: std::env::var("SHOAL_WEBHOOK_URL").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    pub fn request_pause(&self) -> Duration {
        Duration::from_millis(self.request_pause_ms)
    }

    pub fn submit_pause(&self) -> Duration {
        Duration::from_millis(self.submit_pause_ms)
    }

    pub fn label_poll_interval(&self) -> Duration {
        Duration::from_secs(self.label_poll_secs)
    }

    pub fn label_max_wait(&self) -> Duration {
        Duration::from_secs(self.label_max_wait_secs)
    }

    /// Load the per-shop contexts from the shops JSON file
    pub fn load_shops(&self) -> Result<Vec<ShopContext>, BoxError> {
        let raw = std::fs::read_to_string(&self.shops_file)
            .map_err(|e| format!("cannot read shops file {}: {e}", self.shops_file))?;
        let entries: Vec<ShopEntry> = serde_json::from_str(&raw)
            .map_err(|e| format!("shops file {} is malformed: {e}", self.shops_file))?;
        if entries.is_empty() {
            return Err("shops file contains no shops".into());
        }
        entries.into_iter().map(ShopEntry::into_context).collect()
    }
}

/// One entry of the shops JSON file
#[derive(Debug, Deserialize)]
pub struct ShopEntry {
    pub code: String,
    pub country_label: String,
    pub shop_id: u64,
    pub access_token: String,
    /// IANA timezone name, e.g. "Asia/Singapore"
    #[serde(default)]
    pub timezone: Option<String>,
    /// Sheet tab name; defaults to the shop code
    #[serde(default)]
    pub sheet_name: Option<String>,
}

impl ShopEntry {
    fn into_context(self) -> Result<ShopContext, BoxError> {
        let mut shop = ShopContext::new(
            self.code.clone(),
            self.country_label,
            self.shop_id,
            self.access_token,
        );
        if let Some(tz) = self.timezone {
            let tz: Tz = tz
                .parse()
                .map_err(|_| format!("shop {}: unknown timezone {tz:?}", self.code))?;
            shop = shop.with_timezone(tz);
        }
        if let Some(sheet) = self.sheet_name {
            shop = shop.with_sheet_name(sheet);
        }
        Ok(shop)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
