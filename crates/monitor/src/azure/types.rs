use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A row of an ARM resource listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceList {
    #[serde(default)]
    pub value: Vec<ResourceSummary>,
    #[serde(rename = "nextLink", default)]
    pub next_link: Option<String>,
}

/// A portal dashboard as returned by ARM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub properties: serde_json::Value,
}

impl DashboardResource {
    /// Title shown in the portal, falling back to the resource name.
    pub fn title(&self) -> &str {
        self.tags
            .get("hidden-title")
            .map(String::as_str)
            .or(self.name.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Average,
    Total,
    Maximum,
    Minimum,
    Count,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Average => "Average",
            Aggregation::Total => "Total",
            Aggregation::Maximum => "Maximum",
            Aggregation::Minimum => "Minimum",
            Aggregation::Count => "Count",
        }
    }
}

impl Default for Aggregation {
    fn default() -> Self {
        Aggregation::Average
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "average" => Ok(Aggregation::Average),
            "total" => Ok(Aggregation::Total),
            "maximum" => Ok(Aggregation::Maximum),
            "minimum" => Ok(Aggregation::Minimum),
            "count" => Ok(Aggregation::Count),
            other => Err(Error::Validation(format!("Unknown aggregation: {}", other))),
        }
    }
}

/// Parameters of an Azure Monitor metrics query.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub metric_names: Vec<String>,
    pub aggregation: Aggregation,
    /// ISO 8601 duration, e.g. `PT1H`.
    pub timespan: String,
    pub interval: String,
}

impl MetricQuery {
    pub fn new(metric_names: Vec<String>) -> Self {
        Self {
            metric_names,
            aggregation: Aggregation::Average,
            timespan: "PT1H".to_string(),
            interval: "PT5M".to_string(),
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_timespan(mut self, timespan: impl Into<String>) -> Self {
        self.timespan = timespan.into();
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub timespan: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub value: Vec<Metric>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalizableString {
    pub value: String,
    #[serde(rename = "localizedValue", default)]
    pub localized_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metric {
    pub name: LocalizableString,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub timeseries: Vec<TimeSeriesElement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesElement {
    #[serde(default)]
    pub data: Vec<MetricValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricValue {
    #[serde(rename = "timeStamp")]
    pub time_stamp: DateTime<Utc>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub count: Option<f64>,
}

impl MetricValue {
    /// The value for `aggregation`, if the point carries it.
    pub fn value(&self, aggregation: Aggregation) -> Option<f64> {
        match aggregation {
            Aggregation::Average => self.average,
            Aggregation::Total => self.total,
            Aggregation::Maximum => self.maximum,
            Aggregation::Minimum => self.minimum,
            Aggregation::Count => self.count,
        }
    }
}
