use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// Dashboard document submitted to `projects.dashboards.create`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub display_name: String,
    pub mosaic_layout: MosaicLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MosaicLayout {
    pub columns: u32,
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub x_pos: u32,
    pub y_pos: u32,
    pub width: u32,
    pub height: u32,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub title: String,
    pub xy_chart: XyChart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XyChart {
    pub data_sets: Vec<DataSet>,
    pub y_axis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y2_axis: Option<Axis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSet {
    pub time_series_query: TimeSeriesQuery,
    pub plot_type: String,
    pub target_axis: TargetAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesQuery {
    pub time_series_filter: TimeSeriesFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesFilter {
    pub filter: String,
    pub aggregation: AggregationSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationSpec {
    pub alignment_period: String,
    pub per_series_aligner: Aligner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Aligner {
    AlignMean,
    AlignRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetAxis {
    Y1,
    Y2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub label: String,
    pub scale: String,
}

impl Axis {
    pub fn linear(label: &str) -> Self {
        Self {
            label: label.to_string(),
            scale: "LINEAR".to_string(),
        }
    }
}

/// Dashboard metadata returned by create, get and list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDashboardsResponse {
    #[serde(default)]
    pub dashboards: Vec<DashboardInfo>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A point in time split into whole seconds and a nanosecond remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Pre-epoch instants clamp to the epoch. A leap second's extra nanos fold
    /// into the last representable nanosecond.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let seconds = at.timestamp();
        if seconds < 0 {
            return Self {
                seconds: 0,
                nanos: 0,
            };
        }
        let nanos = at.timestamp_subsec_nanos().min(999_999_999);
        Self {
            seconds,
            nanos: nanos as i32,
        }
    }

    pub fn to_rfc3339(&self) -> String {
        Utc.timestamp_opt(self.seconds, self.nanos as u32)
            .single()
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDescriptor {
    #[serde(rename = "type")]
    pub metric_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitoredResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    pub end_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedValue {
    pub double_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub interval: TimeInterval,
    pub value: TypedValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub metric: MetricDescriptor,
    pub resource: MonitoredResource,
    pub points: Vec<Point>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_splits_seconds_and_nanos() {
        let at = Utc.timestamp_opt(1_762_164_000, 250_000_000).unwrap();
        let ts = Timestamp::from_datetime(at);
        assert_eq!(ts.seconds, 1_762_164_000);
        assert_eq!(ts.nanos, 250_000_000);
        assert_eq!(ts.to_rfc3339(), "2025-11-03T10:00:00.250000000Z");
    }

    #[test]
    fn timestamp_now_is_in_range() {
        let ts = Timestamp::now();
        assert!(ts.seconds > 0);
        assert!((0..1_000_000_000).contains(&ts.nanos));
    }

    #[test]
    fn leap_second_nanos_are_clamped() {
        let at = Utc.timestamp_opt(1_483_228_799, 1_500_000_000).unwrap();
        let ts = Timestamp::from_datetime(at);
        assert_eq!(ts.nanos, 999_999_999);
    }

    #[test]
    fn pre_epoch_clamps_to_zero() {
        let at = Utc.timestamp_opt(-10, 5).unwrap();
        assert_eq!(Timestamp::from_datetime(at), Timestamp { seconds: 0, nanos: 0 });
    }

    #[test]
    fn list_response_reads_page_token() {
        let page: ListDashboardsResponse = serde_json::from_str(
            r#"{"dashboards": [{"name": "projects/demo/dashboards/abc", "displayName": "Ops", "mosaicLayout": {"columns": 12}}], "nextPageToken": "tok"}"#,
        )
        .unwrap();
        assert_eq!(page.dashboards[0].display_name, "Ops");
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
    }
}
