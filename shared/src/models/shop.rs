//! Per-shop context
//!
//! Credentials and endpoint/timezone configuration for one marketplace shop.
//! Built once at process start from explicit configuration and passed into
//! each client and ledger constructor; there is no global shop registry.

use chrono_tz::Tz;

/// Per-shop credentials and configuration, keyed by shop code
///
/// Immutable once loaded for a run.
#[derive(Debug, Clone)]
pub struct ShopContext {
    /// Short shop code, e.g. "SG" or "MY"
    pub code: String,
    /// Country/shop label written into ledger rows
    pub country_label: String,
    /// Numeric marketplace shop identifier
    pub shop_id: u64,
    /// Current shop-scoped access token (refresh is external)
    pub access_token: String,
    /// Timezone used to render order dates in the ledger
    pub timezone: Tz,
    /// Sheet/tab name backing this shop's ledger
    pub sheet_name: String,
}

impl ShopContext {
    pub fn new(
        code: impl Into<String>,
        country_label: impl Into<String>,
        shop_id: u64,
        access_token: impl Into<String>,
    ) -> Self {
        let code = code.into();
        Self {
            sheet_name: code.clone(),
            code,
            country_label: country_label.into(),
            shop_id,
            access_token: access_token.into(),
            timezone: chrono_tz::Asia::Singapore,
        }
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = sheet_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let shop = ShopContext::new("SG", "Singapore", 7654321, "token-abc");
        assert_eq!(shop.sheet_name, "SG");
        assert_eq!(shop.timezone, chrono_tz::Asia::Singapore);

        let shop = shop
            .with_timezone(chrono_tz::Asia::Kuala_Lumpur)
            .with_sheet_name("MY-orders");
        assert_eq!(shop.timezone, chrono_tz::Asia::Kuala_Lumpur);
        assert_eq!(shop.sheet_name, "MY-orders");
    }
}
