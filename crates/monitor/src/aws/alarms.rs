//! CloudWatch alarm provisioning with optional SNS notification routing.

use std::sync::Arc;
use tracing::{debug, error, info};

use super::client::{AlarmApi, TopicApi};
use super::types::{
    AlarmRecord, AlarmSpec, AlarmState, ComparisonOperator, Dimension, Statistic, SubscriptionSpec,
};
use crate::sinks::StatusSink;

pub const DEFAULT_EC2_CPU_THRESHOLD: f64 = 80.0;
pub const DEFAULT_RDS_CONNECTION_THRESHOLD: f64 = 80.0;
pub const DEFAULT_LAMBDA_ERROR_THRESHOLD: f64 = 5.0;

const PERIOD_SECONDS: i32 = 300;

pub fn ec2_cpu_alarm(instance_id: &str, threshold: f64, actions: Vec<String>) -> AlarmSpec {
    AlarmSpec {
        name: format!("EC2-HighCPU-{}", instance_id),
        metric_name: "CPUUtilization".to_string(),
        namespace: "AWS/EC2".to_string(),
        comparison_operator: ComparisonOperator::GreaterThanThreshold,
        threshold,
        evaluation_periods: 2,
        period: PERIOD_SECONDS,
        statistic: Statistic::Average,
        dimensions: vec![Dimension::new("InstanceId", instance_id)],
        alarm_actions: actions,
        actions_enabled: true,
        description: format!("Alarm when EC2 CPU exceeds {:?}%", threshold),
    }
}

pub fn rds_connection_alarm(db_instance_id: &str, threshold: f64, actions: Vec<String>) -> AlarmSpec {
    AlarmSpec {
        name: format!("RDS-HighConnections-{}", db_instance_id),
        metric_name: "DatabaseConnections".to_string(),
        namespace: "AWS/RDS".to_string(),
        comparison_operator: ComparisonOperator::GreaterThanThreshold,
        threshold,
        evaluation_periods: 2,
        period: PERIOD_SECONDS,
        statistic: Statistic::Average,
        dimensions: vec![Dimension::new("DBInstanceIdentifier", db_instance_id)],
        alarm_actions: actions,
        actions_enabled: true,
        description: format!("Alarm when RDS connections exceed {:?}", threshold),
    }
}

pub fn lambda_error_alarm(function_name: &str, threshold: f64, actions: Vec<String>) -> AlarmSpec {
    AlarmSpec {
        name: format!("Lambda-Errors-{}", function_name),
        metric_name: "Errors".to_string(),
        namespace: "AWS/Lambda".to_string(),
        comparison_operator: ComparisonOperator::GreaterThanThreshold,
        threshold,
        evaluation_periods: 1,
        period: PERIOD_SECONDS,
        statistic: Statistic::Sum,
        dimensions: vec![Dimension::new("FunctionName", function_name)],
        alarm_actions: actions,
        actions_enabled: true,
        description: format!("Alarm when Lambda errors exceed {:?}", threshold),
    }
}

/// Fires as soon as any target behind the load balancer is unhealthy.
pub fn alb_target_health_alarm(
    load_balancer: &str,
    target_group: &str,
    actions: Vec<String>,
) -> AlarmSpec {
    AlarmSpec {
        name: format!("ALB-UnhealthyTargets-{}", load_balancer),
        metric_name: "UnHealthyHostCount".to_string(),
        namespace: "AWS/ApplicationELB".to_string(),
        comparison_operator: ComparisonOperator::GreaterThanThreshold,
        threshold: 0.0,
        evaluation_periods: 2,
        period: PERIOD_SECONDS,
        statistic: Statistic::Average,
        dimensions: vec![
            Dimension::new("LoadBalancer", load_balancer),
            Dimension::new("TargetGroup", target_group),
        ],
        alarm_actions: actions,
        actions_enabled: true,
        description: "Alarm when ALB has unhealthy targets".to_string(),
    }
}

pub fn custom_metric_alarm(
    metric_name: &str,
    namespace: &str,
    threshold: f64,
    comparison_operator: Option<ComparisonOperator>,
    actions: Vec<String>,
) -> AlarmSpec {
    AlarmSpec {
        name: format!("Custom-{}-Alert", metric_name),
        metric_name: metric_name.to_string(),
        namespace: namespace.to_string(),
        comparison_operator: comparison_operator.unwrap_or_default(),
        threshold,
        evaluation_periods: 2,
        period: PERIOD_SECONDS,
        statistic: Statistic::Average,
        dimensions: Vec::new(),
        alarm_actions: actions,
        actions_enabled: true,
        description: format!("Alarm for custom metric {}", metric_name),
    }
}

pub struct AlarmManager {
    alarms: Arc<dyn AlarmApi>,
    topics: Arc<dyn TopicApi>,
    sink: Arc<dyn StatusSink>,
    sns_topic_arn: Option<String>,
}

impl AlarmManager {
    pub fn new(
        alarms: Arc<dyn AlarmApi>,
        topics: Arc<dyn TopicApi>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            alarms,
            topics,
            sink,
            sns_topic_arn: None,
        }
    }

    /// Route alarm actions to an existing topic instead of creating one.
    pub fn with_topic_arn(mut self, topic_arn: String) -> Self {
        self.sns_topic_arn = Some(topic_arn);
        self
    }

    pub fn topic_arn(&self) -> Option<&str> {
        self.sns_topic_arn.as_deref()
    }

    /// Alarm actions for new alarms. Empty when no topic is known.
    fn alarm_actions(&self) -> Vec<String> {
        self.sns_topic_arn.iter().cloned().collect()
    }

    pub async fn create_sns_topic(&mut self, topic_name: &str) -> Option<String> {
        match self.topics.create_topic(topic_name).await {
            Ok(arn) => {
                info!("Created SNS topic {}", arn);
                self.sns_topic_arn = Some(arn.clone());
                self.sink.success(format!("SNS Topic created: {}", arn));
                Some(arn)
            }
            Err(e) => {
                error!("Failed to create SNS topic {}: {}", topic_name, e);
                self.sink.failure(format!("Error creating SNS topic: {}", e));
                None
            }
        }
    }

    pub async fn subscribe_email_to_topic(&self, email_address: &str) -> Option<String> {
        let Some(topic_arn) = &self.sns_topic_arn else {
            self.sink.failure("Error: SNS topic ARN not set".to_string());
            return None;
        };

        let subscription = SubscriptionSpec::email(topic_arn.clone(), email_address);
        match self.topics.subscribe(&subscription).await {
            Ok(subscription_arn) => {
                info!("Subscribed {} to {}", email_address, topic_arn);
                self.sink.success(format!(
                    "Email subscription created. Check {} for confirmation.",
                    email_address
                ));
                Some(subscription_arn)
            }
            Err(e) => {
                error!("Failed to subscribe {}: {}", email_address, e);
                self.sink.failure(format!("Error subscribing email: {}", e));
                None
            }
        }
    }

    pub async fn create_ec2_cpu_alarm(&self, instance_id: &str, threshold: Option<f64>) -> Option<String> {
        let spec = ec2_cpu_alarm(
            instance_id,
            threshold.unwrap_or(DEFAULT_EC2_CPU_THRESHOLD),
            self.alarm_actions(),
        );
        self.put_alarm(spec, "EC2 CPU").await
    }

    pub async fn create_rds_connection_alarm(
        &self,
        db_instance_id: &str,
        threshold: Option<f64>,
    ) -> Option<String> {
        let spec = rds_connection_alarm(
            db_instance_id,
            threshold.unwrap_or(DEFAULT_RDS_CONNECTION_THRESHOLD),
            self.alarm_actions(),
        );
        self.put_alarm(spec, "RDS connection").await
    }

    pub async fn create_lambda_error_alarm(
        &self,
        function_name: &str,
        threshold: Option<f64>,
    ) -> Option<String> {
        let spec = lambda_error_alarm(
            function_name,
            threshold.unwrap_or(DEFAULT_LAMBDA_ERROR_THRESHOLD),
            self.alarm_actions(),
        );
        self.put_alarm(spec, "Lambda error").await
    }

    pub async fn create_alb_target_health_alarm(
        &self,
        load_balancer: &str,
        target_group: &str,
    ) -> Option<String> {
        let spec = alb_target_health_alarm(load_balancer, target_group, self.alarm_actions());
        self.put_alarm(spec, "ALB health").await
    }

    pub async fn create_custom_metric_alarm(
        &self,
        metric_name: &str,
        namespace: &str,
        threshold: f64,
        comparison_operator: Option<ComparisonOperator>,
    ) -> Option<String> {
        let spec = custom_metric_alarm(
            metric_name,
            namespace,
            threshold,
            comparison_operator,
            self.alarm_actions(),
        );
        self.put_alarm(spec, "custom metric").await
    }

    async fn put_alarm(&self, spec: AlarmSpec, kind: &str) -> Option<String> {
        debug!(
            "PutMetricAlarm {} ({}/{} {} {})",
            spec.name, spec.namespace, spec.metric_name, spec.comparison_operator, spec.threshold
        );
        if spec.alarm_actions.is_empty() {
            debug!("Alarm {} has no notification target", spec.name);
        }

        match self.alarms.put_metric_alarm(&spec).await {
            Ok(()) => {
                info!("Created alarm {}", spec.name);
                self.sink.success(format!("Alarm created: {}", spec.name));
                Some(spec.name)
            }
            Err(e) => {
                error!("Failed to create alarm {}: {}", spec.name, e);
                self.sink
                    .failure(format!("Error creating {} alarm: {}", kind, e));
                None
            }
        }
    }

    pub async fn list_alarms(&self, state: Option<AlarmState>) -> Option<Vec<AlarmRecord>> {
        match self.alarms.describe_alarms(state).await {
            Ok(alarms) => {
                self.sink.heading("🔔 CloudWatch Alarms:".to_string());
                for alarm in &alarms {
                    let icon = if alarm.is_ok() { "✅" } else { "🚨" };
                    self.sink.detail(format!("  {} {}", icon, alarm.name));
                    self.sink.detail(format!("     State: {}", alarm.state));
                    self.sink.detail(format!(
                        "     Metric: {}",
                        alarm.metric_name.as_deref().unwrap_or("-")
                    ));
                    self.sink.detail(format!(
                        "     Threshold: {}",
                        alarm
                            .threshold
                            .map(|t| format!("{:?}", t))
                            .unwrap_or_else(|| "-".to_string())
                    ));
                    self.sink.detail(String::new());
                }
                Some(alarms)
            }
            Err(e) => {
                error!("Failed to list alarms: {}", e);
                self.sink.failure(format!("Error listing alarms: {}", e));
                None
            }
        }
    }

    pub async fn delete_alarm(&self, alarm_name: &str) -> bool {
        match self.alarms.delete_alarms(vec![alarm_name.to_string()]).await {
            Ok(()) => {
                info!("Deleted alarm {}", alarm_name);
                self.sink.success(format!("Alarm deleted: {}", alarm_name));
                true
            }
            Err(e) => {
                error!("Failed to delete alarm {}: {}", alarm_name, e);
                self.sink.failure(format!("Error deleting alarm: {}", e));
                false
            }
        }
    }

    /// Deletes every alarm in one batch. Returns how many were deleted; an empty
    /// account yields `Some(0)` without a delete call.
    pub async fn delete_all_alarms(&self) -> Option<usize> {
        let alarms = match self.alarms.describe_alarms(None).await {
            Ok(alarms) => alarms,
            Err(e) => {
                error!("Failed to list alarms for deletion: {}", e);
                self.sink.failure(format!("Error deleting alarms: {}", e));
                return None;
            }
        };

        let names: Vec<String> = alarms.into_iter().map(|a| a.name).collect();
        if names.is_empty() {
            self.sink.info("No alarms to delete".to_string());
            return Some(0);
        }

        let count = names.len();
        match self.alarms.delete_alarms(names).await {
            Ok(()) => {
                info!("Deleted {} alarms", count);
                self.sink.success(format!("Deleted {} alarms", count));
                Some(count)
            }
            Err(e) => {
                error!("Failed to delete alarms: {}", e);
                self.sink.failure(format!("Error deleting alarms: {}", e));
                None
            }
        }
    }
}
