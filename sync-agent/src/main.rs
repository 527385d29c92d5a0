use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use sync_agent::config::Config;
use sync_agent::fulfillment::FulfillmentBridge;
use sync_agent::label::{LabelWorkflow, LocalLabelStorage};
use sync_agent::ledger::{OrderLedger, RemoteSheet};
use sync_agent::notify::Notifier;
use sync_agent::runner::{RunSettings, ShopPipeline, SyncAgent};
use sync_agent::{logger, print_banner};

use shoal_marketplace::{MarketplaceClient, MarketplaceConfig};
use shoal_warehouse::client::StaticTokenProvider;
use shoal_warehouse::WarehouseClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logger::init_logger();
    print_banner();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to load configuration")?;
    let run_id = uuid::Uuid::new_v4();
    tracing::info!(%run_id, environment = %config.environment, "Starting order sync");

    let shops = config
        .load_shops()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to load shop contexts")?;
    tracing::info!(shops = shops.len(), "Shops loaded");

    let marketplace_config = MarketplaceConfig::new(
        &config.marketplace_base_url,
        config.partner_id,
        &config.partner_key,
    )
    .with_request_pause(config.request_pause());

    let settings = RunSettings {
        order_limit: config.order_limit,
        days_back: config.days_back,
        label_limit: config.label_limit,
    };

    let mut pipelines = Vec::with_capacity(shops.len());
    for shop in shops {
        let client = Arc::new(MarketplaceClient::new(
            marketplace_config.clone(),
            shop.clone(),
        ));

        let sheet = Arc::new(RemoteSheet::new(
            &config.sheet_base_url,
            &config.spreadsheet_id,
            &shop.sheet_name,
            &config.sheet_token,
        ));
        let ledger = OrderLedger::new(sheet, shop.clone());

        let labels = LabelWorkflow::new(
            client.clone(),
            Arc::new(LocalLabelStorage::new(&config.label_dir)),
            config.label_poll_interval(),
            config.label_max_wait(),
        );

        let fulfillment = config.fulfillment_enabled.then(|| {
            let warehouse = WarehouseClient::new(
                &config.warehouse_base_url,
                &config.warehouse_token,
                Arc::new(StaticTokenProvider(config.warehouse_token.clone())),
            );
            FulfillmentBridge::new(
                Arc::new(warehouse),
                shop.clone(),
                &config.default_payment_method,
                &config.default_carrier,
                config.submit_pause(),
            )
        });

        pipelines.push(ShopPipeline::new(
            shop,
            client,
            ledger,
            labels,
            fulfillment,
            settings.clone(),
        ));
    }

    let agent = SyncAgent::new(pipelines, Notifier::new(config.webhook_url.clone()));
    let reports = agent.run_all().await.context("Run cycle failed")?;

    for report in &reports {
        if !report.is_clean() {
            tracing::warn!(shop = %report.shop_code, "Cycle finished with failures");
        }
    }
    tracing::info!("All shops processed");
    Ok(())
}
