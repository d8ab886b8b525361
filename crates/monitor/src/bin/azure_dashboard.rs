use std::sync::Arc;

use anyhow::{Context, Result};
use realtime_monitor::{
    azure::{ArmClient, AzureDashboardManager},
    config::Config,
    demo, logging,
    sinks::StdoutSink,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");

    let config = Config::load()?;
    info!(
        "Targeting subscription {} resource group {}",
        config.azure.subscription_id, config.azure.resource_group
    );

    let client = Arc::new(ArmClient::new(&config.azure).context("Failed to build ARM client")?);
    let sink = Arc::new(StdoutSink::new(&config.output));
    let manager = AzureDashboardManager::new(
        config.azure.subscription_id.clone(),
        config.azure.resource_group.clone(),
        client.clone(),
        client,
        sink.clone(),
    );

    demo::run_azure_dashboard_demo(&manager, sink.as_ref(), &config.azure.dashboard_name).await;
    Ok(())
}
