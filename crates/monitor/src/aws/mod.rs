//! AWS: CloudWatch alarms and dashboards, SNS notification topics.

pub mod alarms;
pub mod client;
pub mod dashboard;
pub mod types;

pub use alarms::AlarmManager;
pub use client::{load_sdk_config, AlarmApi, CloudWatchClient, DashboardApi, SnsClient, TopicApi};
pub use dashboard::CloudWatchDashboard;
pub use types::*;
