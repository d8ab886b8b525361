use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

use super::client::TimeSeriesApi;
use super::types::{MetricDescriptor, MonitoredResource, Point, TimeInterval, TimeSeries, Timestamp, TypedValue};
use crate::sinks::StatusSink;

pub const CUSTOM_METRIC_PREFIX: &str = "custom.googleapis.com";

/// One double-valued point for `custom.googleapis.com/{metric_type}` on the
/// `global` resource, ending at `end_time`.
pub fn custom_time_series(
    project_id: &str,
    metric_type: &str,
    value: f64,
    labels: BTreeMap<String, String>,
    end_time: Timestamp,
) -> TimeSeries {
    let mut resource_labels = BTreeMap::new();
    resource_labels.insert("project_id".to_string(), project_id.to_string());

    TimeSeries {
        metric: MetricDescriptor {
            metric_type: format!("{}/{}", CUSTOM_METRIC_PREFIX, metric_type),
            labels,
        },
        resource: MonitoredResource {
            resource_type: "global".to_string(),
            labels: resource_labels,
        },
        points: vec![Point {
            interval: TimeInterval { end_time },
            value: TypedValue {
                double_value: value,
            },
        }],
    }
}

pub struct MetricWriter {
    project_id: String,
    project_name: String,
    api: Arc<dyn TimeSeriesApi>,
    sink: Arc<dyn StatusSink>,
}

impl MetricWriter {
    pub fn new(project_id: &str, api: Arc<dyn TimeSeriesApi>, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            project_id: project_id.to_string(),
            project_name: format!("projects/{}", project_id),
            api,
            sink,
        }
    }

    /// Write a single point stamped with the current time. No batching.
    pub async fn write_custom_metric(
        &self,
        metric_type: &str,
        value: f64,
        labels: Option<BTreeMap<String, String>>,
    ) -> bool {
        let series = custom_time_series(
            &self.project_id,
            metric_type,
            value,
            labels.unwrap_or_default(),
            Timestamp::now(),
        );
        debug!("Writing {} = {} to {}", series.metric.metric_type, value, self.project_name);

        match self
            .api
            .create_time_series(&self.project_name, std::slice::from_ref(&series))
            .await
        {
            Ok(()) => {
                self.sink
                    .success(format!("Custom metric written: {} = {}", metric_type, value));
                true
            }
            Err(e) => {
                error!("Failed to write metric {}: {}", metric_type, e);
                self.sink.failure(format!("Error writing custom metric: {}", e));
                false
            }
        }
    }
}
