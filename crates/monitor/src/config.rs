use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_AWS_REGION: &str = "us-east-1";
pub const DEFAULT_CLOUDWATCH_DASHBOARD: &str = "RealTimeMonitoringDashboard";
pub const DEFAULT_TOPIC_NAME: &str = "MonitoringAlerts";
pub const DEFAULT_AZURE_DASHBOARD: &str = "RealTimeMonitoringDashboard";
pub const DEFAULT_AZURE_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_GCP_DASHBOARD: &str = "Real-Time-Monitoring-Dashboard";
pub const DEFAULT_GCP_ENDPOINT: &str = "https://monitoring.googleapis.com";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json")]
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Text
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            pretty: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub aws: AwsConfig,
    pub azure: AzureConfig,
    pub gcp: GcpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    /// Overrides the SDK endpoint, e.g. for LocalStack.
    pub endpoint_url: Option<String>,
    pub dashboard_name: String,
    pub topic_name: String,
    pub alarm_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub subscription_id: String,
    pub resource_group: String,
    #[serde(default, skip_serializing)]
    pub access_token: String,
    pub management_endpoint: String,
    pub dashboard_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    pub project_id: String,
    #[serde(default, skip_serializing)]
    pub access_token: String,
    pub monitoring_endpoint: String,
    pub dashboard_name: String,
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let output_format = match var("OUTPUT_FORMAT", "text").to_lowercase().as_str() {
            "text" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            other => {
                return Err(crate::Error::Config(format!(
                    "OUTPUT_FORMAT must be 'text' or 'json', got '{}'",
                    other
                )))
            }
        };

        let config = Config {
            aws: AwsConfig {
                region: var("AWS_REGION", DEFAULT_AWS_REGION),
                endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|v| !v.is_empty()),
                dashboard_name: var("CLOUDWATCH_DASHBOARD_NAME", DEFAULT_CLOUDWATCH_DASHBOARD),
                topic_name: var("SNS_TOPIC_NAME", DEFAULT_TOPIC_NAME),
                alarm_email: lookup("ALARM_EMAIL").filter(|v| !v.is_empty()),
            },
            azure: AzureConfig {
                subscription_id: var("AZURE_SUBSCRIPTION_ID", "your-subscription-id"),
                resource_group: var("AZURE_RESOURCE_GROUP", "your-resource-group"),
                access_token: var("AZURE_ACCESS_TOKEN", ""),
                management_endpoint: var("AZURE_MANAGEMENT_ENDPOINT", DEFAULT_AZURE_ENDPOINT),
                dashboard_name: var("AZURE_DASHBOARD_NAME", DEFAULT_AZURE_DASHBOARD),
            },
            gcp: GcpConfig {
                project_id: var("GCP_PROJECT_ID", "your-gcp-project-id"),
                access_token: var("GCP_ACCESS_TOKEN", ""),
                monitoring_endpoint: var("GCP_MONITORING_ENDPOINT", DEFAULT_GCP_ENDPOINT),
                dashboard_name: var("GCP_DASHBOARD_NAME", DEFAULT_GCP_DASHBOARD),
            },
            output: OutputConfig {
                format: output_format,
                pretty: matches!(
                    var("OUTPUT_PRETTY", "false").to_lowercase().as_str(),
                    "1" | "true" | "yes"
                ),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::Result<()> {
        for (name, endpoint) in [
            ("AZURE_MANAGEMENT_ENDPOINT", &self.azure.management_endpoint),
            ("GCP_MONITORING_ENDPOINT", &self.gcp.monitoring_endpoint),
        ] {
            Url::parse(endpoint).map_err(|e| {
                crate::Error::Config(format!("{} is not a valid URL ({}): {}", name, endpoint, e))
            })?;
        }
        if let Some(endpoint) = &self.aws.endpoint_url {
            Url::parse(endpoint).map_err(|e| {
                crate::Error::Config(format!("AWS_ENDPOINT_URL is not a valid URL ({}): {}", endpoint, e))
            })?;
        }

        if self.azure.access_token.is_empty() {
            tracing::warn!("AZURE_ACCESS_TOKEN is not set. Azure requests will be rejected.");
        }
        if self.gcp.access_token.is_empty() {
            tracing::warn!("GCP_ACCESS_TOKEN is not set. GCP requests will be rejected.");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws: AwsConfig {
                region: DEFAULT_AWS_REGION.to_string(),
                endpoint_url: None,
                dashboard_name: DEFAULT_CLOUDWATCH_DASHBOARD.to_string(),
                topic_name: DEFAULT_TOPIC_NAME.to_string(),
                alarm_email: None,
            },
            azure: AzureConfig {
                subscription_id: "your-subscription-id".to_string(),
                resource_group: "your-resource-group".to_string(),
                access_token: "".to_string(),
                management_endpoint: DEFAULT_AZURE_ENDPOINT.to_string(),
                dashboard_name: DEFAULT_AZURE_DASHBOARD.to_string(),
            },
            gcp: GcpConfig {
                project_id: "your-gcp-project-id".to_string(),
                access_token: "".to_string(),
                monitoring_endpoint: DEFAULT_GCP_ENDPOINT.to_string(),
                dashboard_name: DEFAULT_GCP_DASHBOARD.to_string(),
            },
            output: OutputConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.aws.dashboard_name, "RealTimeMonitoringDashboard");
        assert_eq!(config.aws.topic_name, "MonitoringAlerts");
        assert!(config.aws.endpoint_url.is_none());
        assert_eq!(config.gcp.dashboard_name, "Real-Time-Monitoring-Dashboard");
        assert_eq!(config.azure.management_endpoint, "https://management.azure.com");
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.pretty);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("AWS_REGION", "eu-west-1"),
            ("AWS_ENDPOINT_URL", "http://localhost:4566"),
            ("GCP_PROJECT_ID", "prod-observability"),
            ("AZURE_RESOURCE_GROUP", "rg-monitoring"),
            ("OUTPUT_FORMAT", "JSON"),
            ("OUTPUT_PRETTY", "true"),
        ]))
        .unwrap();
        assert_eq!(config.aws.region, "eu-west-1");
        assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.gcp.project_id, "prod-observability");
        assert_eq!(config.azure.resource_group, "rg-monitoring");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
    }

    #[test]
    fn invalid_output_format_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("OUTPUT_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("GCP_MONITORING_ENDPOINT", "not a url")]))
            .unwrap_err();
        assert!(err.to_string().contains("GCP_MONITORING_ENDPOINT"));
    }

    #[test]
    fn tokens_are_not_serialized() {
        let config = Config::from_lookup(lookup_from(&[("AZURE_ACCESS_TOKEN", "secret-token")])).unwrap();
        let rendered = serde_json::to_string(&config).unwrap();
        assert!(!rendered.contains("secret-token"));
    }
}
