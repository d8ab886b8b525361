//! CloudWatch and SNS access.
//!
//! Managers only see the narrow traits below; the SDK-backed clients are the
//! production implementations and tests swap in mocks.

use async_trait::async_trait;
use aws_sdk_cloudwatch::config::Region;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::types as cw;
use chrono::DateTime;

use super::types::{AlarmRecord, AlarmSpec, AlarmState, DashboardEntry, SubscriptionSpec};
use crate::config::AwsConfig;
use crate::{Error, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlarmApi: Send + Sync {
    async fn put_metric_alarm(&self, alarm: &AlarmSpec) -> Result<()>;
    async fn describe_alarms(&self, state: Option<AlarmState>) -> Result<Vec<AlarmRecord>>;
    async fn delete_alarms(&self, names: Vec<String>) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TopicApi: Send + Sync {
    /// Returns the topic ARN.
    async fn create_topic(&self, name: &str) -> Result<String>;
    /// Returns the subscription ARN (or "pending confirmation").
    async fn subscribe(&self, subscription: &SubscriptionSpec) -> Result<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Create or replace. Returns the validation messages CloudWatch attached.
    async fn put_dashboard(&self, name: &str, body: &str) -> Result<Vec<String>>;
    async fn get_dashboard(&self, name: &str) -> Result<String>;
    async fn delete_dashboards(&self, names: Vec<String>) -> Result<()>;
    async fn list_dashboards(&self) -> Result<Vec<DashboardEntry>>;
}

/// Load shared SDK configuration: default credential chain, configured region,
/// optional endpoint override.
pub async fn load_sdk_config(config: &AwsConfig) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint.clone());
    }

    loader.load().await
}

fn provider_error<E: std::error::Error>(err: E) -> Error {
    Error::Provider(DisplayErrorContext(&err).to_string())
}

pub struct CloudWatchClient {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchClient {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudwatch::Client::new(sdk_config),
        }
    }

    pub fn from_client(client: aws_sdk_cloudwatch::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AlarmApi for CloudWatchClient {
    async fn put_metric_alarm(&self, alarm: &AlarmSpec) -> Result<()> {
        let mut request = self
            .client
            .put_metric_alarm()
            .alarm_name(&alarm.name)
            .comparison_operator(cw::ComparisonOperator::from(alarm.comparison_operator.as_str()))
            .evaluation_periods(alarm.evaluation_periods)
            .metric_name(&alarm.metric_name)
            .namespace(&alarm.namespace)
            .period(alarm.period)
            .statistic(cw::Statistic::from(alarm.statistic.as_str()))
            .threshold(alarm.threshold)
            .actions_enabled(alarm.actions_enabled)
            .set_alarm_actions(Some(alarm.alarm_actions.clone()))
            .alarm_description(&alarm.description);

        for dimension in &alarm.dimensions {
            request = request.dimensions(
                cw::Dimension::builder()
                    .name(&dimension.name)
                    .value(&dimension.value)
                    .build(),
            );
        }

        request.send().await.map_err(provider_error)?;
        Ok(())
    }

    async fn describe_alarms(&self, state: Option<AlarmState>) -> Result<Vec<AlarmRecord>> {
        let mut alarms = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .describe_alarms()
                .set_state_value(state.map(|s| cw::StateValue::from(s.as_str())))
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(provider_error)?;

            alarms.extend(output.metric_alarms().iter().map(|alarm| AlarmRecord {
                name: alarm.alarm_name().unwrap_or_default().to_string(),
                state: alarm
                    .state_value()
                    .map(|s| s.as_str().to_string())
                    .unwrap_or_default(),
                metric_name: alarm.metric_name().map(str::to_string),
                threshold: alarm.threshold(),
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(alarms)
    }

    async fn delete_alarms(&self, names: Vec<String>) -> Result<()> {
        self.client
            .delete_alarms()
            .set_alarm_names(Some(names))
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for CloudWatchClient {
    async fn put_dashboard(&self, name: &str, body: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .put_dashboard()
            .dashboard_name(name)
            .dashboard_body(body)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .dashboard_validation_messages()
            .iter()
            .map(|m| match (m.data_path(), m.message()) {
                (Some(path), Some(message)) => format!("{}: {}", path, message),
                (_, message) => message.unwrap_or_default().to_string(),
            })
            .collect())
    }

    async fn get_dashboard(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .get_dashboard()
            .dashboard_name(name)
            .send()
            .await
            .map_err(provider_error)?;

        output
            .dashboard_body()
            .map(str::to_string)
            .ok_or_else(|| Error::Provider(format!("Dashboard {} has no body", name)))
    }

    async fn delete_dashboards(&self, names: Vec<String>) -> Result<()> {
        self.client
            .delete_dashboards()
            .set_dashboard_names(Some(names))
            .send()
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn list_dashboards(&self) -> Result<Vec<DashboardEntry>> {
        let mut entries = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_dashboards()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(provider_error)?;

            entries.extend(output.dashboard_entries().iter().map(|entry| DashboardEntry {
                name: entry.dashboard_name().unwrap_or_default().to_string(),
                last_modified: entry
                    .last_modified()
                    .and_then(|ts| DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())),
                size: entry.size(),
            }));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(entries)
    }
}

pub struct SnsClient {
    client: aws_sdk_sns::Client,
}

impl SnsClient {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_sns::Client::new(sdk_config),
        }
    }

    pub fn from_client(client: aws_sdk_sns::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TopicApi for SnsClient {
    async fn create_topic(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(provider_error)?;

        output
            .topic_arn()
            .map(str::to_string)
            .ok_or_else(|| Error::Provider(format!("CreateTopic for {} returned no ARN", name)))
    }

    async fn subscribe(&self, subscription: &SubscriptionSpec) -> Result<String> {
        let output = self
            .client
            .subscribe()
            .topic_arn(&subscription.topic_arn)
            .protocol(&subscription.protocol)
            .endpoint(&subscription.endpoint)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(output
            .subscription_arn()
            .unwrap_or("pending confirmation")
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::alarms::ec2_cpu_alarm;
    use aws_sdk_cloudwatch::operation::describe_alarms::{DescribeAlarmsError, DescribeAlarmsOutput};
    use aws_sdk_cloudwatch::operation::list_dashboards::ListDashboardsOutput;
    use aws_sdk_cloudwatch::operation::put_metric_alarm::PutMetricAlarmOutput;
    use aws_sdk_cloudwatch::primitives::DateTime as SmithyDateTime;
    use aws_sdk_cloudwatch::types::error::InvalidNextToken;
    use aws_sdk_sns::operation::create_topic::CreateTopicOutput;
    use aws_smithy_mocks::{mock, mock_client, RuleMode};

    fn metric_alarm(name: &str, state: cw::StateValue) -> cw::MetricAlarm {
        cw::MetricAlarm::builder()
            .alarm_name(name)
            .state_value(state)
            .metric_name("CPUUtilization")
            .threshold(80.0)
            .build()
    }

    #[tokio::test]
    async fn put_metric_alarm_maps_spec_onto_request() {
        let put = mock!(aws_sdk_cloudwatch::Client::put_metric_alarm)
            .match_requests(|req| {
                let dimensions: Vec<(Option<&str>, Option<&str>)> = req
                    .dimensions()
                    .iter()
                    .map(|d| (d.name(), d.value()))
                    .collect();
                req.alarm_name() == Some("EC2-HighCPU-i-abc")
                    && req.namespace() == Some("AWS/EC2")
                    && req.metric_name() == Some("CPUUtilization")
                    && req.comparison_operator() == Some(&cw::ComparisonOperator::GreaterThanThreshold)
                    && req.statistic() == Some(&cw::Statistic::Average)
                    && req.threshold() == Some(80.0)
                    && req.evaluation_periods() == Some(2)
                    && req.period() == Some(300)
                    && req.actions_enabled() == Some(true)
                    && req.alarm_actions().len() == 1
                    && req.alarm_actions()[0] == "arn:aws:sns:us-east-1:123456789012:MonitoringAlerts"
                    && dimensions == vec![(Some("InstanceId"), Some("i-abc"))]
            })
            .then_output(|| PutMetricAlarmOutput::builder().build());

        let client = CloudWatchClient::from_client(mock_client!(aws_sdk_cloudwatch, RuleMode::MatchAny, [&put]));
        let spec = ec2_cpu_alarm(
            "i-abc",
            80.0,
            vec!["arn:aws:sns:us-east-1:123456789012:MonitoringAlerts".to_string()],
        );
        assert!(client.put_metric_alarm(&spec).await.is_ok());
    }

    #[tokio::test]
    async fn describe_alarms_follows_next_token() {
        let first = mock!(aws_sdk_cloudwatch::Client::describe_alarms)
            .match_requests(|req| req.next_token().is_none() && req.state_value() == Some(&cw::StateValue::Alarm))
            .then_output(|| {
                DescribeAlarmsOutput::builder()
                    .metric_alarms(metric_alarm("EC2-HighCPU-i-abc", cw::StateValue::Alarm))
                    .next_token("t2")
                    .build()
            });
        let second = mock!(aws_sdk_cloudwatch::Client::describe_alarms)
            .match_requests(|req| req.next_token() == Some("t2") && req.state_value() == Some(&cw::StateValue::Alarm))
            .then_output(|| {
                DescribeAlarmsOutput::builder()
                    .metric_alarms(metric_alarm("RDS-HighConnections-db1", cw::StateValue::Alarm))
                    .build()
            });

        let client = CloudWatchClient::from_client(mock_client!(
            aws_sdk_cloudwatch,
            RuleMode::MatchAny,
            [&first, &second]
        ));
        let alarms = client.describe_alarms(Some(AlarmState::Alarm)).await.unwrap();
        let names: Vec<&str> = alarms.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["EC2-HighCPU-i-abc", "RDS-HighConnections-db1"]);
        assert_eq!(alarms[0].state, "ALARM");
        assert_eq!(alarms[0].threshold, Some(80.0));
    }

    #[tokio::test]
    async fn describe_alarms_service_error_is_provider_error() {
        let rejected = mock!(aws_sdk_cloudwatch::Client::describe_alarms).then_error(|| {
            DescribeAlarmsError::InvalidNextToken(InvalidNextToken::builder().message("bad token").build())
        });

        let client = CloudWatchClient::from_client(mock_client!(aws_sdk_cloudwatch, RuleMode::MatchAny, [&rejected]));
        let err = client.describe_alarms(None).await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn list_dashboards_follows_next_token() {
        let first = mock!(aws_sdk_cloudwatch::Client::list_dashboards)
            .match_requests(|req| req.next_token().is_none())
            .then_output(|| {
                ListDashboardsOutput::builder()
                    .dashboard_entries(
                        cw::DashboardEntry::builder()
                            .dashboard_name("RealTimeMonitoringDashboard")
                            .last_modified(SmithyDateTime::from_secs(1_762_171_200))
                            .size(2048)
                            .build(),
                    )
                    .next_token("t2")
                    .build()
            });
        let second = mock!(aws_sdk_cloudwatch::Client::list_dashboards)
            .match_requests(|req| req.next_token() == Some("t2"))
            .then_output(|| {
                ListDashboardsOutput::builder()
                    .dashboard_entries(cw::DashboardEntry::builder().dashboard_name("Ops").build())
                    .build()
            });

        let client = CloudWatchClient::from_client(mock_client!(
            aws_sdk_cloudwatch,
            RuleMode::MatchAny,
            [&first, &second]
        ));
        let entries = client.list_dashboards().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "RealTimeMonitoringDashboard");
        assert_eq!(
            entries[0].last_modified.map(|ts| ts.to_rfc3339()).as_deref(),
            Some("2025-11-03T12:00:00+00:00")
        );
        assert_eq!(entries[0].size, Some(2048));
        assert_eq!(entries[1].name, "Ops");
        assert!(entries[1].last_modified.is_none());
    }

    #[tokio::test]
    async fn create_topic_returns_arn() {
        let create = mock!(aws_sdk_sns::Client::create_topic)
            .match_requests(|req| req.name() == Some("MonitoringAlerts"))
            .then_output(|| {
                CreateTopicOutput::builder()
                    .topic_arn("arn:aws:sns:us-east-1:123456789012:MonitoringAlerts")
                    .build()
            });

        let client = SnsClient::from_client(mock_client!(aws_sdk_sns, RuleMode::MatchAny, [&create]));
        assert_eq!(
            client.create_topic("MonitoringAlerts").await.unwrap(),
            "arn:aws:sns:us-east-1:123456789012:MonitoringAlerts"
        );
    }
}
