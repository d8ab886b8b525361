//! Azure: portal dashboards and Azure Monitor metric queries over ARM.

pub mod client;
pub mod dashboard;
pub mod types;

pub use client::{ArmClient, MetricsApi, PortalApi};
pub use dashboard::{portal_dashboard, AzureDashboardManager, PortalDashboard};
pub use types::*;
