use std::sync::Arc;

use anyhow::{Context, Result};
use realtime_monitor::{
    config::Config,
    demo,
    gcp::{GcpDashboardManager, MonitoringClient},
    logging,
    sinks::StdoutSink,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");

    let config = Config::load()?;
    let client = MonitoringClient::new(&config.gcp).context("Failed to build monitoring client")?;
    let sink = Arc::new(StdoutSink::new(&config.output));
    let manager = GcpDashboardManager::new(&config.gcp.project_id, Arc::new(client), sink.clone());

    demo::run_gcp_dashboard_demo(&manager, sink.as_ref(), &config.gcp.dashboard_name).await;
    Ok(())
}
