//! GCP: Cloud Monitoring dashboards and custom metric points over REST.

pub mod client;
pub mod dashboard;
pub mod metrics;
pub mod types;

pub use client::{DashboardsApi, MonitoringClient, TimeSeriesApi};
pub use dashboard::{monitoring_dashboard, GcpDashboardManager};
pub use metrics::MetricWriter;
pub use types::*;
