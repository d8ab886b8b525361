use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

use super::client::{MetricsApi, PortalApi};
use super::types::{Aggregation, DashboardResource, MetricQuery, MetricsResponse, ResourceSummary};
use crate::sinks::StatusSink;

const CHART_PART_TYPE: &str = "Extension/HubsExtension/PartType/MonitorChartPart";
const TIME_RANGE_TYPE: &str = "MsPortalFx.Composition.Configuration.ValueTypes.TimeRange";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalDashboard {
    pub location: String,
    pub tags: BTreeMap<String, String>,
    pub properties: DashboardProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardProperties {
    pub lenses: Vec<Lens>,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    pub order: u32,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub position: PartPosition,
    pub metadata: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartPosition {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "colSpan")]
    pub col_span: u32,
    #[serde(rename = "rowSpan")]
    pub row_span: u32,
}

impl PartPosition {
    pub fn new(x: u32, y: u32, col_span: u32, row_span: u32) -> Self {
        Self {
            x,
            y,
            col_span,
            row_span,
        }
    }
}

/// Builds chart parts scoped to one subscription and resource group.
struct ChartScope<'a> {
    subscription_id: &'a str,
    resource_group: &'a str,
}

impl ChartScope<'_> {
    fn resource_id(&self, provider: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}",
            self.subscription_id, self.resource_group, provider
        )
    }

    fn chart_part(
        &self,
        position: PartPosition,
        provider: &str,
        metrics: &[(&str, &str)],
        title: &str,
        chart_type: &str,
    ) -> Part {
        let resource_id = self.resource_id(provider);
        let metrics: Vec<Value> = metrics
            .iter()
            .map(|(name, aggregation)| {
                json!({
                    "resourceMetadata": {"id": resource_id},
                    "name": name,
                    "aggregationType": aggregation
                })
            })
            .collect();

        Part {
            position,
            metadata: json!({
                "inputs": [{
                    "name": "options",
                    "value": {
                        "chart": {
                            "metrics": metrics,
                            "title": title,
                            "titleKind": "Auto",
                            "visualization": {"chartType": chart_type}
                        }
                    }
                }],
                "type": CHART_PART_TYPE
            }),
        }
    }
}

/// The fixed layout: VM CPU, SQL DTU, App Service requests, storage transactions,
/// Application Insights response time and exceptions. Shows the last 24 hours.
pub fn portal_dashboard(name: &str, subscription_id: &str, resource_group: &str) -> PortalDashboard {
    let scope = ChartScope {
        subscription_id,
        resource_group,
    };

    let parts = vec![
        scope.chart_part(
            PartPosition::new(0, 0, 6, 4),
            "Microsoft.Compute/virtualMachines",
            &[("Percentage CPU", "Average")],
            "VM CPU Utilization",
            "Line",
        ),
        scope.chart_part(
            PartPosition::new(6, 0, 6, 4),
            "Microsoft.Sql/servers/databases",
            &[("dtu_consumption_percent", "Average")],
            "SQL Database DTU Usage",
            "Line",
        ),
        scope.chart_part(
            PartPosition::new(0, 4, 6, 4),
            "Microsoft.Web/sites",
            &[("Requests", "Total")],
            "App Service Requests",
            "Bar",
        ),
        scope.chart_part(
            PartPosition::new(6, 4, 6, 4),
            "Microsoft.Storage/storageAccounts",
            &[("Transactions", "Total")],
            "Storage Transactions",
            "Line",
        ),
        scope.chart_part(
            PartPosition::new(0, 8, 12, 4),
            "Microsoft.Insights/components",
            &[("requests/duration", "Average"), ("exceptions/count", "Sum")],
            "Application Insights - Response Time & Exceptions",
            "Line",
        ),
    ];

    let mut tags = BTreeMap::new();
    tags.insert("hidden-title".to_string(), name.to_string());

    PortalDashboard {
        location: "global".to_string(),
        tags,
        properties: DashboardProperties {
            lenses: vec![Lens { order: 0, parts }],
            metadata: json!({
                "model": {
                    "timeRange": {
                        "value": {"relative": {"duration": 24, "timeUnit": 1}},
                        "type": TIME_RANGE_TYPE
                    }
                }
            }),
        },
    }
}

pub struct AzureDashboardManager {
    subscription_id: String,
    resource_group: String,
    portal: Arc<dyn PortalApi>,
    metrics: Arc<dyn MetricsApi>,
    sink: Arc<dyn StatusSink>,
}

impl AzureDashboardManager {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        portal: Arc<dyn PortalApi>,
        metrics: Arc<dyn MetricsApi>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            portal,
            metrics,
            sink,
        }
    }

    pub async fn create_dashboard(&self, dashboard_name: &str) -> Option<DashboardResource> {
        let dashboard = portal_dashboard(dashboard_name, &self.subscription_id, &self.resource_group);

        match self.portal.put_dashboard(dashboard_name, &dashboard).await {
            Ok(resource) => {
                info!("Put portal dashboard {}", dashboard_name);
                self.sink
                    .success(format!("Dashboard '{}' created successfully!", dashboard_name));
                self.sink.detail(format!(
                    "  Dashboard ID: {}",
                    resource.id.as_deref().unwrap_or("unknown")
                ));
                Some(resource)
            }
            Err(e) => {
                error!("Failed to create dashboard {}: {}", dashboard_name, e);
                self.sink.failure(format!("Error creating dashboard: {}", e));
                None
            }
        }
    }

    pub async fn list_dashboards(&self) -> Option<Vec<ResourceSummary>> {
        match self.portal.list_dashboards().await {
            Ok(dashboards) => {
                self.sink.heading("📊 Available Azure Dashboards:".to_string());
                for dashboard in &dashboards {
                    self.sink.detail(format!("  - {}", dashboard.name));
                    self.sink.detail(format!(
                        "    Location: {}",
                        dashboard.location.as_deref().unwrap_or("unknown")
                    ));
                    self.sink.detail(String::new());
                }
                Some(dashboards)
            }
            Err(e) => {
                error!("Failed to list dashboards in {}: {}", self.resource_group, e);
                self.sink.failure(format!("Error listing dashboards: {}", e));
                None
            }
        }
    }

    pub async fn get_dashboard(&self, dashboard_name: &str) -> Option<DashboardResource> {
        match self.portal.get_dashboard(dashboard_name).await {
            Ok(resource) => {
                self.sink
                    .success(format!("Dashboard retrieved: {}", resource.title()));
                Some(resource)
            }
            Err(e) => {
                error!("Failed to get dashboard {}: {}", dashboard_name, e);
                self.sink.failure(format!("Error getting dashboard: {}", e));
                None
            }
        }
    }

    /// Query Azure Monitor for `metric_names` on one resource and print every data
    /// point carrying the requested aggregation.
    pub async fn get_metrics(
        &self,
        resource_id: &str,
        metric_names: &[String],
        aggregation: Option<Aggregation>,
        timespan: Option<&str>,
    ) -> Option<MetricsResponse> {
        let mut query = MetricQuery::new(metric_names.to_vec())
            .with_aggregation(aggregation.unwrap_or_default());
        if let Some(timespan) = timespan {
            query = query.with_timespan(timespan);
        }

        match self.metrics.list_metrics(resource_id, &query).await {
            Ok(response) => {
                self.sink
                    .heading(format!("📈 Metrics for resource: {}", resource_id));
                for metric in &response.value {
                    self.sink.detail(format!("  Metric: {}", metric.name.value));
                    self.sink.detail(format!(
                        "  Unit: {}",
                        metric.unit.as_deref().unwrap_or("Unspecified")
                    ));
                    for series in &metric.timeseries {
                        for point in &series.data {
                            if let Some(value) = point.value(query.aggregation) {
                                self.sink.detail(format!(
                                    "    {}: {}",
                                    point.time_stamp.to_rfc3339(),
                                    value
                                ));
                            }
                        }
                    }
                }
                Some(response)
            }
            Err(e) => {
                error!("Failed to get metrics for {}: {}", resource_id, e);
                self.sink.failure(format!("Error getting metrics: {}", e));
                None
            }
        }
    }

    pub async fn delete_dashboard(&self, dashboard_name: &str) -> bool {
        match self.portal.delete_dashboard(dashboard_name).await {
            Ok(()) => {
                info!("Deleted portal dashboard {}", dashboard_name);
                self.sink
                    .success(format!("Dashboard '{}' deleted successfully", dashboard_name));
                true
            }
            Err(e) => {
                error!("Failed to delete dashboard {}: {}", dashboard_name, e);
                self.sink.failure(format!("Error deleting dashboard: {}", e));
                false
            }
        }
    }
}
