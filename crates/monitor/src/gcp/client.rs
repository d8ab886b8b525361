//! Cloud Monitoring REST access: dashboards (v1) and time series (v3).

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

use super::types::{Dashboard, DashboardInfo, ListDashboardsResponse, TimeSeries};
use crate::config::GcpConfig;
use crate::http::RestClient;
use crate::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardsApi: Send + Sync {
    async fn create_dashboard(&self, parent: &str, dashboard: &Dashboard) -> Result<DashboardInfo>;
    async fn list_dashboards(&self, parent: &str) -> Result<Vec<DashboardInfo>>;
    async fn get_dashboard(&self, name: &str) -> Result<DashboardInfo>;
    async fn delete_dashboard(&self, name: &str) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimeSeriesApi: Send + Sync {
    async fn create_time_series(&self, project_name: &str, series: &[TimeSeries]) -> Result<()>;
}

pub struct MonitoringClient {
    rest: RestClient,
}

impl MonitoringClient {
    pub fn new(config: &GcpConfig) -> Result<Self> {
        let rest = RestClient::new(&config.monitoring_endpoint)?
            .with_auth_token(config.access_token.clone());
        Ok(Self { rest })
    }

    /// `parent` and `name` are full resource names such as `projects/p/dashboards/d`.
    pub fn dashboards_url(&self, parent: &str) -> Url {
        self.rest.url(&format!("v1/{}/dashboards", parent))
    }

    pub fn dashboard_url(&self, name: &str) -> Url {
        self.rest.url(&format!("v1/{}", name))
    }

    pub fn time_series_url(&self, project_name: &str) -> Url {
        self.rest.url(&format!("v3/{}/timeSeries", project_name))
    }
}

#[async_trait]
impl DashboardsApi for MonitoringClient {
    async fn create_dashboard(&self, parent: &str, dashboard: &Dashboard) -> Result<DashboardInfo> {
        self.rest
            .send_json(Method::POST, self.dashboards_url(parent), dashboard)
            .await
    }

    async fn list_dashboards(&self, parent: &str) -> Result<Vec<DashboardInfo>> {
        let mut dashboards = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.dashboards_url(parent);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: ListDashboardsResponse = self.rest.get_json(url).await?;
            dashboards.extend(page.dashboards);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(dashboards)
    }

    async fn get_dashboard(&self, name: &str) -> Result<DashboardInfo> {
        self.rest.get_json(self.dashboard_url(name)).await
    }

    async fn delete_dashboard(&self, name: &str) -> Result<()> {
        self.rest.delete(self.dashboard_url(name)).await
    }
}

#[async_trait]
impl TimeSeriesApi for MonitoringClient {
    async fn create_time_series(&self, project_name: &str, series: &[TimeSeries]) -> Result<()> {
        let body = json!({ "timeSeries": series });
        let _: Value = self
            .rest
            .send_json(Method::POST, self.time_series_url(project_name), &body)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::stub;
    use axum::extract::{Query, State};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    fn client_at(endpoint: &str) -> MonitoringClient {
        MonitoringClient::new(&GcpConfig {
            project_id: "demo".to_string(),
            access_token: String::new(),
            monitoring_endpoint: endpoint.to_string(),
            dashboard_name: "Real-Time-Monitoring-Dashboard".to_string(),
        })
        .unwrap()
    }

    fn client() -> MonitoringClient {
        client_at("https://monitoring.googleapis.com")
    }

    type PageTokens = Arc<Mutex<Vec<Option<String>>>>;

    async fn dashboard_page(
        State(tokens): State<PageTokens>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        let token = params.get("pageToken").cloned();
        tokens.lock().unwrap().push(token.clone());

        match token.as_deref() {
            None => Json(json!({
                "dashboards": [{"name": "projects/p/dashboards/1", "displayName": "A"}],
                "nextPageToken": "t2",
            })),
            _ => Json(json!({
                "dashboards": [{"name": "projects/p/dashboards/2", "displayName": "B"}],
                "nextPageToken": "",
            })),
        }
    }

    #[tokio::test]
    async fn list_dashboards_follows_page_token() {
        let tokens: PageTokens = Arc::new(Mutex::new(Vec::new()));
        let recorded = tokens.clone();
        let base = stub::serve(move |_| {
            Router::new()
                .route("/v1/projects/p/dashboards", get(dashboard_page))
                .with_state(recorded)
        })
        .await;

        let names: Vec<String> = client_at(&base)
            .list_dashboards("projects/p")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.display_name)
            .collect();

        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(*tokens.lock().unwrap(), vec![None, Some("t2".to_string())]);
    }

    #[tokio::test]
    async fn missing_dashboard_surfaces_api_error() {
        let base = stub::serve(|_| {
            Router::new().route(
                "/v1/projects/p/dashboards/gone",
                get(|| async {
                    (
                        axum::http::StatusCode::NOT_FOUND,
                        Json(json!({"error": {"code": 404, "message": "Requested entity was not found."}})),
                    )
                }),
            )
        })
        .await;

        let err = client_at(&base)
            .get_dashboard("projects/p/dashboards/gone")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Api { status: 404, .. }));
    }

    #[test]
    fn urls_follow_resource_names() {
        let client = client();
        assert_eq!(
            client.dashboards_url("projects/demo").as_str(),
            "https://monitoring.googleapis.com/v1/projects/demo/dashboards"
        );
        assert_eq!(
            client.dashboard_url("projects/demo/dashboards/abc").as_str(),
            "https://monitoring.googleapis.com/v1/projects/demo/dashboards/abc"
        );
        assert_eq!(
            client.time_series_url("projects/demo").as_str(),
            "https://monitoring.googleapis.com/v3/projects/demo/timeSeries"
        );
    }
}
