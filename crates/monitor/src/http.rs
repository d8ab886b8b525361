//! Thin JSON-over-HTTP helper shared by the Azure and GCP REST clients.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl RestClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", base_url, e)))?;

        Ok(Self {
            client: Client::new(),
            base_url,
            auth_token: None,
        })
    }

    /// Set bearer token. An empty token leaves requests unauthenticated.
    pub fn with_auth_token(mut self, token: String) -> Self {
        if !token.is_empty() {
            self.auth_token = Some(token);
        }
        self
    }

    /// Resolve `path` below the base URL, keeping any path prefix the base already has.
    pub fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.execute(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    pub async fn send_json<B, T>(&self, method: Method, url: Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.client.request(method, url).json(body))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, url: Url) -> Result<()> {
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn execute(&self, mut request: RequestBuilder) -> Result<Response> {
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} {}", status.as_u16(), response.url());

        if !status.is_success() {
            let error_text = response.text().await?;
            return Err(Error::Api {
                status: status.as_u16(),
                message: extract_error_message(&error_text),
            });
        }

        Ok(response)
    }
}

/// Both ARM and Google APIs wrap failures as `{"error": {"message": ...}}`.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Local HTTP server used by the REST client tests.
#[cfg(test)]
pub(crate) mod stub {
    use axum::Router;
    use tokio::net::TcpListener;

    /// Bind an ephemeral port, build the router with the resulting base URL,
    /// serve it in the background and return the base URL.
    pub(crate) async fn serve(build: impl FnOnce(&str) -> Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let router = build(&base);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        base
    }
}
