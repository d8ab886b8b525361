use std::sync::Arc;
use tracing::{error, info};

use super::client::DashboardsApi;
use super::types::{
    AggregationSpec, Aligner, Axis, DataSet, Dashboard, DashboardInfo, MosaicLayout, TargetAxis,
    Tile, TimeSeriesFilter, TimeSeriesQuery, Widget, XyChart,
};
use crate::sinks::StatusSink;

pub const LAYOUT_COLUMNS: u32 = 12;
const ALIGNMENT_PERIOD: &str = "300s";

fn data_set(metric_type: &str, resource_type: &str, aligner: Aligner, axis: TargetAxis) -> DataSet {
    DataSet {
        time_series_query: TimeSeriesQuery {
            time_series_filter: TimeSeriesFilter {
                filter: format!(
                    "metric.type=\"{}\" resource.type=\"{}\"",
                    metric_type, resource_type
                ),
                aggregation: AggregationSpec {
                    alignment_period: ALIGNMENT_PERIOD.to_string(),
                    per_series_aligner: aligner,
                },
            },
        },
        plot_type: "LINE".to_string(),
        target_axis: axis,
    }
}

fn chart_tile(
    (x_pos, y_pos, width, height): (u32, u32, u32, u32),
    title: &str,
    data_sets: Vec<DataSet>,
    y_axis: &str,
    y2_axis: Option<&str>,
) -> Tile {
    Tile {
        x_pos,
        y_pos,
        width,
        height,
        widget: Widget {
            title: title.to_string(),
            xy_chart: XyChart {
                data_sets,
                y_axis: Axis::linear(y_axis),
                y2_axis: y2_axis.map(Axis::linear),
            },
        },
    }
}

/// Six line charts on a 12-column mosaic: GCE, Cloud SQL, Cloud Functions,
/// HTTPS load balancing, GKE and the custom application metrics.
pub fn monitoring_dashboard(display_name: &str) -> Dashboard {
    use Aligner::{AlignMean, AlignRate};
    use TargetAxis::{Y1, Y2};

    let tiles = vec![
        chart_tile(
            (0, 0, 6, 4),
            "Compute Engine CPU Utilization",
            vec![data_set(
                "compute.googleapis.com/instance/cpu/utilization",
                "gce_instance",
                AlignMean,
                Y1,
            )],
            "CPU Utilization",
            None,
        ),
        chart_tile(
            (6, 0, 6, 4),
            "Cloud SQL Database Connections",
            vec![data_set(
                "cloudsql.googleapis.com/database/network/connections",
                "cloudsql_database",
                AlignMean,
                Y1,
            )],
            "Connections",
            None,
        ),
        chart_tile(
            (0, 4, 6, 4),
            "Cloud Functions Executions",
            vec![data_set(
                "cloudfunctions.googleapis.com/function/execution_count",
                "cloud_function",
                AlignRate,
                Y1,
            )],
            "Executions/sec",
            None,
        ),
        chart_tile(
            (6, 4, 6, 4),
            "Load Balancer Request Rate",
            vec![data_set(
                "loadbalancing.googleapis.com/https/request_count",
                "https_lb_rule",
                AlignRate,
                Y1,
            )],
            "Requests/sec",
            None,
        ),
        chart_tile(
            (0, 8, 12, 4),
            "GKE Container CPU Utilization",
            vec![data_set(
                "kubernetes.io/container/cpu/core_usage_time",
                "k8s_container",
                AlignRate,
                Y1,
            )],
            "CPU Cores",
            None,
        ),
        chart_tile(
            (0, 12, 12, 4),
            "Custom Application Metrics",
            vec![
                data_set(
                    "custom.googleapis.com/application/active_users",
                    "global",
                    AlignMean,
                    Y1,
                ),
                data_set(
                    "custom.googleapis.com/application/error_rate",
                    "global",
                    AlignMean,
                    Y2,
                ),
            ],
            "Active Users",
            Some("Error Rate"),
        ),
    ];

    Dashboard {
        display_name: display_name.to_string(),
        mosaic_layout: MosaicLayout {
            columns: LAYOUT_COLUMNS,
            tiles,
        },
    }
}

pub struct GcpDashboardManager {
    project_name: String,
    api: Arc<dyn DashboardsApi>,
    sink: Arc<dyn StatusSink>,
}

impl GcpDashboardManager {
    pub fn new(project_id: &str, api: Arc<dyn DashboardsApi>, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            project_name: format!("projects/{}", project_id),
            api,
            sink,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub async fn create_dashboard(&self, display_name: &str) -> Option<DashboardInfo> {
        let dashboard = monitoring_dashboard(display_name);

        match self.api.create_dashboard(&self.project_name, &dashboard).await {
            Ok(created) => {
                info!("Created dashboard {} as {}", display_name, created.name);
                self.sink
                    .success(format!("Dashboard '{}' created successfully!", display_name));
                self.sink.detail(format!("  Dashboard name: {}", created.name));
                Some(created)
            }
            Err(e) => {
                error!("Failed to create dashboard {}: {}", display_name, e);
                self.sink.failure(format!("Error creating dashboard: {}", e));
                None
            }
        }
    }

    pub async fn list_dashboards(&self) -> Option<Vec<DashboardInfo>> {
        match self.api.list_dashboards(&self.project_name).await {
            Ok(dashboards) => {
                self.sink
                    .heading("📊 Available GCP Monitoring Dashboards:".to_string());
                for dashboard in &dashboards {
                    self.sink.detail(format!("  - {}", dashboard.display_name));
                    self.sink.detail(format!("    Name: {}", dashboard.name));
                    self.sink.detail(String::new());
                }
                Some(dashboards)
            }
            Err(e) => {
                error!("Failed to list dashboards in {}: {}", self.project_name, e);
                self.sink.failure(format!("Error listing dashboards: {}", e));
                None
            }
        }
    }

    /// `name` is the full resource name, `projects/{id}/dashboards/{dashboard}`.
    pub async fn get_dashboard(&self, name: &str) -> Option<DashboardInfo> {
        match self.api.get_dashboard(name).await {
            Ok(dashboard) => {
                self.sink
                    .success(format!("Dashboard retrieved: {}", dashboard.display_name));
                Some(dashboard)
            }
            Err(e) => {
                error!("Failed to get dashboard {}: {}", name, e);
                self.sink.failure(format!("Error getting dashboard: {}", e));
                None
            }
        }
    }

    pub async fn delete_dashboard(&self, name: &str) -> bool {
        match self.api.delete_dashboard(name).await {
            Ok(()) => {
                info!("Deleted dashboard {}", name);
                self.sink.success(format!("Dashboard deleted: {}", name));
                true
            }
            Err(e) => {
                error!("Failed to delete dashboard {}: {}", name, e);
                self.sink.failure(format!("Error deleting dashboard: {}", e));
                false
            }
        }
    }
}
