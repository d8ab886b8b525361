//! Fixed demonstration sequences run by the per-provider binaries.

use crate::aws::{AlarmManager, CloudWatchDashboard, ComparisonOperator};
use crate::azure::AzureDashboardManager;
use crate::gcp::GcpDashboardManager;
use crate::sinks::StatusSink;

const PROJECT_TITLE: &str = "Real-Time Monitoring Dashboard Project";

fn rule() -> String {
    "=".repeat(60)
}

pub fn opening_banner(sink: &dyn StatusSink, title: &str) {
    sink.detail(format!("\n{}", rule()));
    sink.detail(title.to_string());
    sink.detail(PROJECT_TITLE.to_string());
    sink.detail(format!("{}\n", rule()));
}

pub fn closing_banner(sink: &dyn StatusSink, completed: &str, where_to_look: &str) {
    sink.detail(format!("\n{}", rule()));
    sink.detail(completed.to_string());
    sink.detail(where_to_look.to_string());
    sink.detail(format!("{}\n", rule()));
}

/// Topic, optional email subscription, the `CustomApp/ErrorRate` alarm, then a listing.
pub async fn run_alarms_demo(
    manager: &mut AlarmManager,
    sink: &dyn StatusSink,
    topic_name: &str,
    alarm_email: Option<&str>,
) {
    opening_banner(sink, "AWS CloudWatch Alarms Manager");

    sink.detail("Creating SNS topic for alarm notifications...".to_string());
    manager.create_sns_topic(topic_name).await;

    if let Some(email) = alarm_email {
        sink.detail("\nSubscribing email to SNS topic...".to_string());
        manager.subscribe_email_to_topic(email).await;
    }

    sink.detail("\nCreating CloudWatch Alarms...".to_string());
    manager
        .create_custom_metric_alarm(
            "ErrorRate",
            "CustomApp",
            5.0,
            Some(ComparisonOperator::GreaterThanThreshold),
        )
        .await;

    sink.detail("\nListing all alarms...".to_string());
    manager.list_alarms(None).await;

    closing_banner(
        sink,
        "Alarm configuration completed!",
        "Check AWS Console > CloudWatch > Alarms to view",
    );
}

pub async fn run_cloudwatch_dashboard_demo(dashboard: &CloudWatchDashboard, sink: &dyn StatusSink) {
    opening_banner(sink, "AWS CloudWatch Dashboard Creator");

    sink.detail("Creating CloudWatch Dashboard...".to_string());
    dashboard.create_dashboard().await;

    sink.detail("\nListing all dashboards...".to_string());
    dashboard.list_dashboards().await;

    closing_banner(
        sink,
        "Dashboard creation completed!",
        "Visit AWS Console > CloudWatch > Dashboards to view",
    );
}

pub async fn run_azure_dashboard_demo(
    manager: &AzureDashboardManager,
    sink: &dyn StatusSink,
    dashboard_name: &str,
) {
    opening_banner(sink, "Azure Monitor Dashboard Creator");

    sink.detail("Creating Azure Monitor Dashboard...".to_string());
    manager.create_dashboard(dashboard_name).await;

    sink.detail("\nListing all dashboards...".to_string());
    manager.list_dashboards().await;

    closing_banner(
        sink,
        "Dashboard creation completed!",
        "Visit Azure Portal > Dashboards to view",
    );
}

pub async fn run_gcp_dashboard_demo(
    manager: &GcpDashboardManager,
    sink: &dyn StatusSink,
    dashboard_name: &str,
) {
    opening_banner(sink, "GCP Cloud Monitoring Dashboard Creator");

    sink.detail("Creating GCP Monitoring Dashboard...".to_string());
    manager.create_dashboard(dashboard_name).await;

    sink.detail("\nListing all dashboards...".to_string());
    manager.list_dashboards().await;

    closing_banner(
        sink,
        "Dashboard creation completed!",
        "Visit GCP Console > Monitoring > Dashboards to view",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::client::{MockAlarmApi, MockDashboardApi, MockTopicApi};
    use crate::aws::AlarmSpec;
    use crate::gcp::client::MockDashboardsApi;
    use crate::gcp::{Dashboard, DashboardInfo};
    use crate::sinks::MemorySink;
    use crate::Error;
    use mockall::Sequence;
    use std::sync::Arc;

    #[tokio::test]
    async fn alarms_demo_routes_custom_alarm_to_new_topic() {
        let mut seq = Sequence::new();
        let mut topics = MockTopicApi::new();
        let mut alarms = MockAlarmApi::new();

        topics
            .expect_create_topic()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("arn:aws:sns:us-east-1:123456789012:MonitoringAlerts".to_string()));
        alarms
            .expect_put_metric_alarm()
            .withf(|spec: &AlarmSpec| {
                spec.name == "Custom-ErrorRate-Alert"
                    && spec.namespace == "CustomApp"
                    && spec.threshold == 5.0
                    && spec.alarm_actions
                        == vec!["arn:aws:sns:us-east-1:123456789012:MonitoringAlerts".to_string()]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        alarms
            .expect_describe_alarms()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));
        topics.expect_subscribe().never();

        let sink = Arc::new(MemorySink::new());
        let mut manager = AlarmManager::new(Arc::new(alarms), Arc::new(topics), sink.clone());
        run_alarms_demo(&mut manager, sink.as_ref(), "MonitoringAlerts", None).await;

        assert!(sink.contains("AWS CloudWatch Alarms Manager"));
        assert!(sink.contains("Alarm configuration completed!"));
        assert!(sink.failures().is_empty());
    }

    #[tokio::test]
    async fn cloudwatch_demo_continues_after_create_failure() {
        let mut api = MockDashboardApi::new();
        api.expect_put_dashboard()
            .times(1)
            .returning(|_, _| Err(Error::Provider("AccessDenied".to_string())));
        api.expect_list_dashboards().times(1).returning(|| Ok(vec![]));

        let sink = Arc::new(MemorySink::new());
        let dashboard = CloudWatchDashboard::new(
            "RealTimeMonitoringDashboard",
            "us-east-1",
            Arc::new(api),
            sink.clone(),
        );
        run_cloudwatch_dashboard_demo(&dashboard, sink.as_ref()).await;

        assert_eq!(sink.failures().len(), 1);
        assert!(sink.contains("Dashboard creation completed!"));
    }

    #[tokio::test]
    async fn gcp_demo_creates_then_lists() {
        let mut seq = Sequence::new();
        let mut api = MockDashboardsApi::new();
        api.expect_create_dashboard()
            .withf(|_: &str, dashboard: &Dashboard| dashboard.display_name == "Real-Time-Monitoring-Dashboard")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(DashboardInfo {
                    name: "projects/demo/dashboards/1".to_string(),
                    display_name: "Real-Time-Monitoring-Dashboard".to_string(),
                    etag: None,
                })
            });
        api.expect_list_dashboards()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));

        let sink = Arc::new(MemorySink::new());
        let manager = GcpDashboardManager::new("demo", Arc::new(api), sink.clone());
        run_gcp_dashboard_demo(&manager, sink.as_ref(), "Real-Time-Monitoring-Dashboard").await;

        assert!(sink.contains("Visit GCP Console > Monitoring > Dashboards to view"));
    }
}
