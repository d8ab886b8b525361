//! Creates the notification topic and a sample custom-metric alarm, then lists alarms.

use std::sync::Arc;

use anyhow::Result;
use realtime_monitor::{
    aws::{load_sdk_config, AlarmManager, CloudWatchClient, SnsClient},
    config::Config,
    demo, logging,
    sinks::StdoutSink,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");

    let config = Config::load()?;
    info!("Using AWS region {}", config.aws.region);

    let sdk_config = load_sdk_config(&config.aws).await;
    let sink = Arc::new(StdoutSink::new(&config.output));
    let mut manager = AlarmManager::new(
        Arc::new(CloudWatchClient::new(&sdk_config)),
        Arc::new(SnsClient::new(&sdk_config)),
        sink.clone(),
    );

    demo::run_alarms_demo(
        &mut manager,
        sink.as_ref(),
        &config.aws.topic_name,
        config.aws.alarm_email.as_deref(),
    )
    .await;

    Ok(())
}
