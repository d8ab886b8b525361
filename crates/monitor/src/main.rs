//! Command-line access to every monitoring operation.
//!
//! Run with: cargo run --bin monitorctl -- <PROVIDER> <COMMAND> [OPTIONS]

use std::collections::BTreeMap;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use realtime_monitor::{
    aws::{
        load_sdk_config, AlarmManager, AlarmState, CloudWatchClient, CloudWatchDashboard,
        ComparisonOperator, SnsClient,
    },
    azure::{Aggregation, ArmClient, AzureDashboardManager},
    config::{Config, OutputFormat},
    gcp::{GcpDashboardManager, MetricWriter, MonitoringClient},
    logging,
    sinks::{StatusSink, StdoutSink},
};
use tracing::debug;

#[derive(Parser)]
#[command(author, version, about = "Provision monitoring dashboards, alarms and custom metrics", long_about = None)]
struct Cli {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Status output format, overrides OUTPUT_FORMAT
    #[arg(short, long, value_enum)]
    output: Option<Format>,

    #[command(subcommand)]
    command: Provider,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Provider {
    /// CloudWatch alarms and dashboards, SNS topics
    Aws {
        #[command(subcommand)]
        command: AwsCommand,
    },
    /// Azure portal dashboards and Azure Monitor metrics
    Azure {
        #[command(subcommand)]
        command: AzureCommand,
    },
    /// GCP Cloud Monitoring dashboards and custom metrics
    Gcp {
        #[command(subcommand)]
        command: GcpCommand,
    },
}

#[derive(Subcommand)]
enum AwsCommand {
    /// SNS notification topics
    Topic {
        #[command(subcommand)]
        command: TopicCommand,
    },
    /// CloudWatch metric alarms
    Alarm {
        /// Existing topic ARN to notify; alarms get no actions when omitted
        #[arg(long, global = true)]
        topic_arn: Option<String>,

        #[command(subcommand)]
        command: AlarmCommand,
    },
    /// CloudWatch dashboard
    Dashboard {
        /// Dashboard name (defaults to CLOUDWATCH_DASHBOARD_NAME)
        #[arg(long, global = true)]
        name: Option<String>,

        #[command(subcommand)]
        command: DashboardCommand,
    },
}

#[derive(Subcommand)]
enum TopicCommand {
    /// Create (or look up) a topic
    Create {
        /// Topic name (defaults to SNS_TOPIC_NAME)
        #[arg(long)]
        name: Option<String>,
    },
    /// Subscribe an email address to a topic
    Subscribe {
        #[arg(long)]
        email: String,

        /// Topic ARN; the SNS_TOPIC_NAME topic is created when omitted
        #[arg(long)]
        topic_arn: Option<String>,
    },
}

#[derive(Subcommand)]
enum AlarmCommand {
    /// High CPU on an EC2 instance
    Ec2 {
        #[arg(long)]
        instance_id: String,
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// High connection count on an RDS instance
    Rds {
        #[arg(long)]
        db_instance_id: String,
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Errors from a Lambda function
    Lambda {
        #[arg(long)]
        function_name: String,
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Unhealthy targets behind an application load balancer
    Alb {
        #[arg(long)]
        load_balancer: String,
        #[arg(long)]
        target_group: String,
    },
    /// Any metric in any namespace
    Custom {
        #[arg(long)]
        metric_name: String,
        #[arg(long)]
        namespace: String,
        #[arg(long)]
        threshold: f64,
        /// e.g. GreaterThanThreshold, LessThanThreshold
        #[arg(long)]
        comparison_operator: Option<ComparisonOperator>,
    },
    /// List alarms, optionally filtered by state (OK, ALARM, INSUFFICIENT_DATA)
    List {
        #[arg(long)]
        state: Option<AlarmState>,
    },
    /// Delete one alarm
    Delete {
        #[arg(long)]
        name: String,
    },
    /// Delete every alarm in the region
    DeleteAll,
}

#[derive(Subcommand)]
enum DashboardCommand {
    Create,
    Get,
    List,
    Delete,
}

#[derive(Subcommand)]
enum AzureCommand {
    /// Portal dashboards in the configured resource group
    Dashboard {
        /// Dashboard name (defaults to AZURE_DASHBOARD_NAME)
        #[arg(long, global = true)]
        name: Option<String>,

        #[command(subcommand)]
        command: DashboardCommand,
    },
    /// Query Azure Monitor metrics for one resource
    Metrics {
        /// Full ARM resource id
        #[arg(long)]
        resource_id: String,

        /// Metric name, repeatable
        #[arg(long = "metric", required = true)]
        metrics: Vec<String>,

        /// Average, Total, Maximum, Minimum or Count
        #[arg(long)]
        aggregation: Option<Aggregation>,

        /// ISO 8601 duration, e.g. PT1H
        #[arg(long)]
        timespan: Option<String>,
    },
}

#[derive(Subcommand)]
enum GcpCommand {
    /// Cloud Monitoring dashboards in the configured project
    Dashboard {
        #[command(subcommand)]
        command: GcpDashboardCommand,
    },
    /// Write one point of a custom metric
    WriteMetric {
        /// Metric type below custom.googleapis.com/, e.g. application/active_users
        #[arg(long)]
        metric_type: String,

        #[arg(long)]
        value: f64,

        /// Metric label as key=value, repeatable
        #[arg(long = "label", value_parser = parse_label)]
        labels: Vec<(String, String)>,
    },
}

#[derive(Subcommand)]
enum GcpDashboardCommand {
    Create {
        /// Display name (defaults to GCP_DASHBOARD_NAME)
        #[arg(long)]
        name: Option<String>,
    },
    List,
    /// Get by full resource name, projects/{project}/dashboards/{id}
    Get {
        #[arg(long)]
        name: String,
    },
    Delete {
        #[arg(long)]
        name: String,
    },
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let mut config = Config::load()?;
    match cli.output {
        Some(Format::Text) => config.output.format = OutputFormat::Text,
        Some(Format::Json) => config.output.format = OutputFormat::Json,
        None => {}
    }
    let sink = Arc::new(StdoutSink::new(&config.output));

    let succeeded = match cli.command {
        Provider::Aws { command } => run_aws(command, &config, sink).await?,
        Provider::Azure { command } => run_azure(command, &config, sink).await?,
        Provider::Gcp { command } => run_gcp(command, &config, sink).await?,
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn run_aws(command: AwsCommand, config: &Config, sink: Arc<dyn StatusSink>) -> Result<bool> {
    let sdk_config = load_sdk_config(&config.aws).await;
    debug!("Loaded AWS SDK config for {}", config.aws.region);

    let succeeded = match command {
        AwsCommand::Topic { command } => {
            let mut manager = AlarmManager::new(
                Arc::new(CloudWatchClient::new(&sdk_config)),
                Arc::new(SnsClient::new(&sdk_config)),
                sink,
            );
            match command {
                TopicCommand::Create { name } => {
                    let name = name.unwrap_or_else(|| config.aws.topic_name.clone());
                    manager.create_sns_topic(&name).await.is_some()
                }
                TopicCommand::Subscribe { email, topic_arn } => {
                    let has_topic = match topic_arn {
                        Some(arn) => {
                            manager = manager.with_topic_arn(arn);
                            true
                        }
                        None => manager
                            .create_sns_topic(&config.aws.topic_name)
                            .await
                            .is_some(),
                    };
                    has_topic && manager.subscribe_email_to_topic(&email).await.is_some()
                }
            }
        }
        AwsCommand::Alarm { topic_arn, command } => {
            let mut manager = AlarmManager::new(
                Arc::new(CloudWatchClient::new(&sdk_config)),
                Arc::new(SnsClient::new(&sdk_config)),
                sink,
            );
            if let Some(arn) = topic_arn {
                manager = manager.with_topic_arn(arn);
            }
            match command {
                AlarmCommand::Ec2 {
                    instance_id,
                    threshold,
                } => manager
                    .create_ec2_cpu_alarm(&instance_id, threshold)
                    .await
                    .is_some(),
                AlarmCommand::Rds {
                    db_instance_id,
                    threshold,
                } => manager
                    .create_rds_connection_alarm(&db_instance_id, threshold)
                    .await
                    .is_some(),
                AlarmCommand::Lambda {
                    function_name,
                    threshold,
                } => manager
                    .create_lambda_error_alarm(&function_name, threshold)
                    .await
                    .is_some(),
                AlarmCommand::Alb {
                    load_balancer,
                    target_group,
                } => manager
                    .create_alb_target_health_alarm(&load_balancer, &target_group)
                    .await
                    .is_some(),
                AlarmCommand::Custom {
                    metric_name,
                    namespace,
                    threshold,
                    comparison_operator,
                } => manager
                    .create_custom_metric_alarm(&metric_name, &namespace, threshold, comparison_operator)
                    .await
                    .is_some(),
                AlarmCommand::List { state } => manager.list_alarms(state).await.is_some(),
                AlarmCommand::Delete { name } => manager.delete_alarm(&name).await,
                AlarmCommand::DeleteAll => manager.delete_all_alarms().await.is_some(),
            }
        }
        AwsCommand::Dashboard { name, command } => {
            let dashboard = CloudWatchDashboard::new(
                name.unwrap_or_else(|| config.aws.dashboard_name.clone()),
                config.aws.region.clone(),
                Arc::new(CloudWatchClient::new(&sdk_config)),
                sink.clone(),
            );
            match command {
                DashboardCommand::Create => dashboard.create_dashboard().await.is_some(),
                DashboardCommand::Get => match dashboard.get_dashboard().await {
                    Some(body) => {
                        sink.detail(serde_json::to_string_pretty(&body)?);
                        true
                    }
                    None => false,
                },
                DashboardCommand::List => dashboard.list_dashboards().await.is_some(),
                DashboardCommand::Delete => dashboard.delete_dashboard().await,
            }
        }
    };

    Ok(succeeded)
}

async fn run_azure(command: AzureCommand, config: &Config, sink: Arc<dyn StatusSink>) -> Result<bool> {
    let client = Arc::new(ArmClient::new(&config.azure).context("Failed to build ARM client")?);
    let manager = AzureDashboardManager::new(
        config.azure.subscription_id.clone(),
        config.azure.resource_group.clone(),
        client.clone(),
        client,
        sink,
    );

    let succeeded = match command {
        AzureCommand::Dashboard { name, command } => {
            let name = name.unwrap_or_else(|| config.azure.dashboard_name.clone());
            match command {
                DashboardCommand::Create => manager.create_dashboard(&name).await.is_some(),
                DashboardCommand::Get => manager.get_dashboard(&name).await.is_some(),
                DashboardCommand::List => manager.list_dashboards().await.is_some(),
                DashboardCommand::Delete => manager.delete_dashboard(&name).await,
            }
        }
        AzureCommand::Metrics {
            resource_id,
            metrics,
            aggregation,
            timespan,
        } => manager
            .get_metrics(&resource_id, &metrics, aggregation, timespan.as_deref())
            .await
            .is_some(),
    };

    Ok(succeeded)
}

async fn run_gcp(command: GcpCommand, config: &Config, sink: Arc<dyn StatusSink>) -> Result<bool> {
    let client = Arc::new(
        MonitoringClient::new(&config.gcp).context("Failed to build monitoring client")?,
    );

    let succeeded = match command {
        GcpCommand::Dashboard { command } => {
            let manager = GcpDashboardManager::new(&config.gcp.project_id, client, sink);
            match command {
                GcpDashboardCommand::Create { name } => {
                    let name = name.unwrap_or_else(|| config.gcp.dashboard_name.clone());
                    manager.create_dashboard(&name).await.is_some()
                }
                GcpDashboardCommand::List => manager.list_dashboards().await.is_some(),
                GcpDashboardCommand::Get { name } => manager.get_dashboard(&name).await.is_some(),
                GcpDashboardCommand::Delete { name } => manager.delete_dashboard(&name).await,
            }
        }
        GcpCommand::WriteMetric {
            metric_type,
            value,
            labels,
        } => {
            let writer = MetricWriter::new(&config.gcp.project_id, client, sink);
            let labels: BTreeMap<String, String> = labels.into_iter().collect();
            let labels = if labels.is_empty() { None } else { Some(labels) };
            writer.write_custom_metric(&metric_type, value, labels).await
        }
    };

    Ok(succeeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_custom_alarm() {
        let cli = Cli::try_parse_from([
            "monitorctl",
            "aws",
            "alarm",
            "custom",
            "--metric-name",
            "ErrorRate",
            "--namespace",
            "CustomApp",
            "--threshold",
            "5",
            "--comparison-operator",
            "LessThanThreshold",
        ])
        .unwrap();

        match cli.command {
            Provider::Aws {
                command:
                    AwsCommand::Alarm {
                        command:
                            AlarmCommand::Custom {
                                comparison_operator,
                                threshold,
                                ..
                            },
                        ..
                    },
            } => {
                assert_eq!(comparison_operator, Some(ComparisonOperator::LessThanThreshold));
                assert_eq!(threshold, 5.0);
            }
            _ => panic!("expected aws alarm custom"),
        }
    }

    #[test]
    fn rejects_unknown_alarm_state() {
        assert!(Cli::try_parse_from(["monitorctl", "aws", "alarm", "list", "--state", "BROKEN"]).is_err());
    }

    #[test]
    fn label_parser_splits_on_first_equals() {
        assert_eq!(
            parse_label("env=prod=eu"),
            Ok(("env".to_string(), "prod=eu".to_string()))
        );
        assert!(parse_label("novalue").is_err());
        assert!(parse_label("=x").is_err());
    }
}
