use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use super::client::DashboardApi;
use super::types::DashboardEntry;
use crate::sinks::StatusSink;

const PERIOD_SECONDS: u32 = 300;
const ERROR_COLOR: &str = "#d62728";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Metric,
    Log,
}

/// One tile of a CloudWatch dashboard body. The grid is 24 units wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub properties: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardBody {
    pub widgets: Vec<Widget>,
}

fn metric_widget(x: u32, y: u32, width: u32, properties: Value) -> Widget {
    Widget {
        kind: WidgetKind::Metric,
        x,
        y,
        width,
        height: 6,
        properties,
    }
}

/// The fixed monitoring layout: EC2, RDS, Lambda, ALB, custom metrics, recent errors.
pub fn dashboard_body(region: &str) -> DashboardBody {
    let widgets = vec![
        metric_widget(
            0,
            0,
            12,
            json!({
                "metrics": [["AWS/EC2", "CPUUtilization", {"stat": "Average"}]],
                "period": PERIOD_SECONDS,
                "stat": "Average",
                "region": region,
                "title": "EC2 CPU Utilization",
                "yAxis": {"left": {"min": 0, "max": 100}}
            }),
        ),
        metric_widget(
            12,
            0,
            12,
            json!({
                "metrics": [["AWS/RDS", "DatabaseConnections", {"stat": "Average"}]],
                "period": PERIOD_SECONDS,
                "stat": "Average",
                "region": region,
                "title": "RDS Database Connections",
                "yAxis": {"left": {"min": 0}}
            }),
        ),
        metric_widget(
            0,
            6,
            12,
            json!({
                "metrics": [
                    ["AWS/Lambda", "Invocations", {"stat": "Sum"}],
                    [".", "Errors", {"stat": "Sum", "color": ERROR_COLOR}]
                ],
                "period": PERIOD_SECONDS,
                "stat": "Sum",
                "region": region,
                "title": "Lambda Invocations and Errors"
            }),
        ),
        metric_widget(
            12,
            6,
            12,
            json!({
                "metrics": [
                    ["AWS/ApplicationELB", "RequestCount", {"stat": "Sum"}],
                    [".", "TargetResponseTime", {"stat": "Average", "yAxis": "right"}]
                ],
                "period": PERIOD_SECONDS,
                "stat": "Average",
                "region": region,
                "title": "ALB Requests and Response Time",
                "yAxis": {"right": {"label": "Response Time (ms)"}}
            }),
        ),
        metric_widget(
            0,
            12,
            24,
            json!({
                "metrics": [
                    ["CustomApp", "ActiveUsers", {"stat": "Average"}],
                    [".", "TransactionsPerSecond", {"stat": "Sum"}],
                    [".", "ErrorRate", {"stat": "Average", "color": ERROR_COLOR}]
                ],
                "period": PERIOD_SECONDS,
                "stat": "Average",
                "region": region,
                "title": "Custom Application Metrics"
            }),
        ),
        Widget {
            kind: WidgetKind::Log,
            x: 0,
            y: 18,
            width: 24,
            height: 6,
            properties: json!({
                "query": "SOURCE '/aws/lambda/my-function' | fields @timestamp, @message | filter @message like /ERROR/ | sort @timestamp desc | limit 20",
                "region": region,
                "title": "Recent Application Errors"
            }),
        },
    ];

    DashboardBody { widgets }
}

pub struct CloudWatchDashboard {
    name: String,
    region: String,
    client: Arc<dyn DashboardApi>,
    sink: Arc<dyn StatusSink>,
}

impl CloudWatchDashboard {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        client: Arc<dyn DashboardApi>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            client,
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create or replace the dashboard. Returns CloudWatch's validation messages.
    pub async fn create_dashboard(&self) -> Option<Vec<String>> {
        let body = match serde_json::to_string(&dashboard_body(&self.region)) {
            Ok(body) => body,
            Err(e) => {
                self.sink.failure(format!("Error creating dashboard: {}", e));
                return None;
            }
        };

        match self.client.put_dashboard(&self.name, &body).await {
            Ok(messages) => {
                info!("Put dashboard {} ({} bytes)", self.name, body.len());
                self.sink
                    .success(format!("Dashboard '{}' created successfully!", self.name));
                if messages.is_empty() {
                    self.sink.detail("  Validation messages: none".to_string());
                } else {
                    for message in &messages {
                        self.sink.detail(format!("  Validation: {}", message));
                    }
                }
                Some(messages)
            }
            Err(e) => {
                error!("Failed to put dashboard {}: {}", self.name, e);
                self.sink.failure(format!("Error creating dashboard: {}", e));
                None
            }
        }
    }

    pub async fn get_dashboard(&self) -> Option<Value> {
        let parsed = match self.client.get_dashboard(&self.name).await {
            Ok(body) => serde_json::from_str::<Value>(&body).map_err(crate::Error::from),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(body) => {
                self.sink
                    .success(format!("Dashboard '{}' retrieved successfully", self.name));
                Some(body)
            }
            Err(e) => {
                error!("Failed to get dashboard {}: {}", self.name, e);
                self.sink.failure(format!("Error retrieving dashboard: {}", e));
                None
            }
        }
    }

    pub async fn delete_dashboard(&self) -> bool {
        match self.client.delete_dashboards(vec![self.name.clone()]).await {
            Ok(()) => {
                info!("Deleted dashboard {}", self.name);
                self.sink
                    .success(format!("Dashboard '{}' deleted successfully", self.name));
                true
            }
            Err(e) => {
                error!("Failed to delete dashboard {}: {}", self.name, e);
                self.sink.failure(format!("Error deleting dashboard: {}", e));
                false
            }
        }
    }

    pub async fn list_dashboards(&self) -> Option<Vec<DashboardEntry>> {
        match self.client.list_dashboards().await {
            Ok(entries) => {
                self.sink
                    .heading("📊 Available CloudWatch Dashboards:".to_string());
                for entry in &entries {
                    let modified = entry
                        .last_modified
                        .map(|ts| ts.to_rfc3339())
                        .unwrap_or_else(|| "unknown".to_string());
                    self.sink.detail(format!(
                        "  - {} (Last Modified: {})",
                        entry.name, modified
                    ));
                }
                Some(entries)
            }
            Err(e) => {
                error!("Failed to list dashboards: {}", e);
                self.sink.failure(format!("Error listing dashboards: {}", e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::client::MockDashboardApi;
    use crate::sinks::MemorySink;
    use crate::Error;
    use chrono::{TimeZone, Utc};

    fn dashboard(client: MockDashboardApi) -> (CloudWatchDashboard, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let dashboard = CloudWatchDashboard::new(
            "RealTimeMonitoringDashboard",
            "us-east-1",
            Arc::new(client),
            sink.clone(),
        );
        (dashboard, sink)
    }

    #[test]
    fn body_has_one_widget_per_category_and_a_log_widget() {
        let body = dashboard_body("eu-central-1");
        let titles: Vec<&str> = body
            .widgets
            .iter()
            .map(|w| w.properties["title"].as_str().unwrap())
            .collect();
        assert_eq!(
            titles,
            vec![
                "EC2 CPU Utilization",
                "RDS Database Connections",
                "Lambda Invocations and Errors",
                "ALB Requests and Response Time",
                "Custom Application Metrics",
                "Recent Application Errors",
            ]
        );
        assert!(body
            .widgets
            .iter()
            .all(|w| w.properties["region"] == "eu-central-1"));
        assert_eq!(body.widgets.last().unwrap().kind, WidgetKind::Log);
    }

    #[test]
    fn body_serializes_type_field() {
        let value = serde_json::to_value(dashboard_body("us-east-1")).unwrap();
        assert_eq!(value["widgets"][0]["type"], "metric");
        assert_eq!(value["widgets"][0]["properties"]["metrics"][0][0], "AWS/EC2");
        assert_eq!(value["widgets"][5]["type"], "log");
    }

    #[tokio::test]
    async fn create_submits_serialized_body_under_name() {
        let mut client = MockDashboardApi::new();
        client
            .expect_put_dashboard()
            .withf(|name: &str, body: &str| {
                let parsed: Value = serde_json::from_str(body).unwrap();
                name == "RealTimeMonitoringDashboard" && parsed["widgets"].as_array().unwrap().len() == 6
            })
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let (dashboard, sink) = dashboard(client);
        assert_eq!(dashboard.create_dashboard().await, Some(vec![]));
        assert!(sink.contains("created successfully"));
    }

    #[tokio::test]
    async fn get_parses_stored_body() {
        let mut client = MockDashboardApi::new();
        client
            .expect_get_dashboard()
            .returning(|_| Ok(r#"{"widgets": []}"#.to_string()));

        let (dashboard, _sink) = dashboard(client);
        let body = dashboard.get_dashboard().await.unwrap();
        assert_eq!(body["widgets"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn get_with_invalid_body_is_failure() {
        let mut client = MockDashboardApi::new();
        client
            .expect_get_dashboard()
            .returning(|_| Ok("not json".to_string()));

        let (dashboard, sink) = dashboard(client);
        assert!(dashboard.get_dashboard().await.is_none());
        assert_eq!(sink.failures().len(), 1);
    }

    #[tokio::test]
    async fn list_prints_entries() {
        let mut client = MockDashboardApi::new();
        client.expect_list_dashboards().returning(|| {
            Ok(vec![DashboardEntry {
                name: "RealTimeMonitoringDashboard".to_string(),
                last_modified: Some(Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap()),
                size: Some(2048),
            }])
        });

        let (dashboard, sink) = dashboard(client);
        let entries = dashboard.list_dashboards().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(sink.contains("- RealTimeMonitoringDashboard (Last Modified: 2025-11-03T12:00:00+00:00)"));
    }

    #[tokio::test]
    async fn delete_failure_returns_false() {
        let mut client = MockDashboardApi::new();
        client
            .expect_delete_dashboards()
            .withf(|names: &Vec<String>| names == &vec!["RealTimeMonitoringDashboard".to_string()])
            .returning(|_| Err(Error::Provider("ResourceNotFound".to_string())));

        let (dashboard, _sink) = dashboard(client);
        assert!(!dashboard.delete_dashboard().await);
    }

    #[tokio::test]
    async fn list_failure_returns_none() {
        let mut api = MockDashboardApi::new();
        api.expect_list_dashboards()
            .times(1)
            .returning(|| Err(Error::Provider("AccessDenied".to_string())));

        let (dashboard, sink) = dashboard(api);
        assert!(dashboard.list_dashboards().await.is_none());
        assert!(!sink.contains("Available CloudWatch Dashboards"));
        assert_eq!(
            sink.failures(),
            vec!["Error listing dashboards: Provider error: AccessDenied".to_string()]
        );
    }
}
