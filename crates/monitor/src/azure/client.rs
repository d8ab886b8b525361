//! Azure Resource Manager access for portal dashboards and Azure Monitor metrics.

use async_trait::async_trait;
use reqwest::Method;
use url::Url;

use super::dashboard::PortalDashboard;
use super::types::{DashboardResource, MetricQuery, MetricsResponse, ResourceList, ResourceSummary};
use crate::config::AzureConfig;
use crate::http::RestClient;
use crate::{Error, Result};

pub const DASHBOARD_API_VERSION: &str = "2020-09-01-preview";
pub const RESOURCES_API_VERSION: &str = "2021-04-01";
pub const METRICS_API_VERSION: &str = "2018-01-01";
pub const DASHBOARD_RESOURCE_TYPE: &str = "Microsoft.Portal/dashboards";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn put_dashboard(&self, name: &str, dashboard: &PortalDashboard) -> Result<DashboardResource>;
    async fn get_dashboard(&self, name: &str) -> Result<DashboardResource>;
    async fn list_dashboards(&self) -> Result<Vec<ResourceSummary>>;
    async fn delete_dashboard(&self, name: &str) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsApi: Send + Sync {
    async fn list_metrics(&self, resource_id: &str, query: &MetricQuery) -> Result<MetricsResponse>;
}

pub struct ArmClient {
    rest: RestClient,
    subscription_id: String,
    resource_group: String,
}

impl ArmClient {
    pub fn new(config: &AzureConfig) -> Result<Self> {
        let rest = RestClient::new(&config.management_endpoint)?
            .with_auth_token(config.access_token.clone());

        Ok(Self {
            rest,
            subscription_id: config.subscription_id.clone(),
            resource_group: config.resource_group.clone(),
        })
    }

    fn resource_group_path(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group
        )
    }

    pub fn dashboard_url(&self, name: &str) -> Url {
        let mut url = self.rest.url(&format!(
            "{}/providers/{}/{}",
            self.resource_group_path(),
            DASHBOARD_RESOURCE_TYPE,
            name
        ));
        url.query_pairs_mut()
            .append_pair("api-version", DASHBOARD_API_VERSION);
        url
    }

    pub fn list_url(&self) -> Url {
        let mut url = self
            .rest
            .url(&format!("{}/resources", self.resource_group_path()));
        url.query_pairs_mut()
            .append_pair("$filter", &format!("resourceType eq '{}'", DASHBOARD_RESOURCE_TYPE))
            .append_pair("api-version", RESOURCES_API_VERSION);
        url
    }

    pub fn metrics_url(&self, resource_id: &str, query: &MetricQuery) -> Url {
        let mut url = self.rest.url(&format!(
            "{}/providers/Microsoft.Insights/metrics",
            resource_id.trim_end_matches('/')
        ));
        url.query_pairs_mut()
            .append_pair("api-version", METRICS_API_VERSION)
            .append_pair("timespan", &query.timespan)
            .append_pair("interval", &query.interval)
            .append_pair("metricnames", &query.metric_names.join(","))
            .append_pair("aggregation", query.aggregation.as_str());
        url
    }
}

#[async_trait]
impl PortalApi for ArmClient {
    async fn put_dashboard(&self, name: &str, dashboard: &PortalDashboard) -> Result<DashboardResource> {
        self.rest
            .send_json(Method::PUT, self.dashboard_url(name), dashboard)
            .await
    }

    async fn get_dashboard(&self, name: &str) -> Result<DashboardResource> {
        self.rest.get_json(self.dashboard_url(name)).await
    }

    async fn list_dashboards(&self) -> Result<Vec<ResourceSummary>> {
        let mut resources = Vec::new();
        let mut next = Some(self.list_url());

        while let Some(url) = next.take() {
            let page: ResourceList = self.rest.get_json(url).await?;
            resources.extend(page.value);
            if let Some(link) = page.next_link.filter(|l| !l.is_empty()) {
                next = Some(
                    Url::parse(&link)
                        .map_err(|e| Error::Provider(format!("Invalid nextLink {}: {}", link, e)))?,
                );
            }
        }

        Ok(resources)
    }

    async fn delete_dashboard(&self, name: &str) -> Result<()> {
        self.rest.delete(self.dashboard_url(name)).await
    }
}

#[async_trait]
impl MetricsApi for ArmClient {
    async fn list_metrics(&self, resource_id: &str, query: &MetricQuery) -> Result<MetricsResponse> {
        self.rest.get_json(self.metrics_url(resource_id, query)).await
    }
}
