use std::sync::Arc;

use anyhow::Result;
use realtime_monitor::{
    aws::{load_sdk_config, CloudWatchClient, CloudWatchDashboard},
    config::Config,
    demo, logging,
    sinks::StdoutSink,
};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");

    let config = Config::load()?;
    let sdk_config = load_sdk_config(&config.aws).await;
    let sink = Arc::new(StdoutSink::new(&config.output));

    let dashboard = CloudWatchDashboard::new(
        config.aws.dashboard_name.clone(),
        config.aws.region.clone(),
        Arc::new(CloudWatchClient::new(&sdk_config)),
        sink.clone(),
    );

    demo::run_cloudwatch_dashboard_demo(&dashboard, sink.as_ref()).await;
    Ok(())
}
