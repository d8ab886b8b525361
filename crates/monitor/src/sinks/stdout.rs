use super::{Status, StatusSink};
use crate::config::{OutputConfig, OutputFormat};

#[derive(Debug)]
pub struct StdoutSink {
    name: String,
    format: OutputFormat,
    pretty: bool, // For JSON output
}

impl StdoutSink {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            name: "stdout".to_string(),
            format: config.format,
            pretty: config.pretty,
        }
    }

    pub fn text() -> Self {
        Self::new(&OutputConfig::default())
    }

    fn format_line(&self, status: &Status) -> String {
        match self.format {
            OutputFormat::Text => status.render(),
            OutputFormat::Json => {
                let serialized = if self.pretty {
                    serde_json::to_string_pretty(status)
                } else {
                    serde_json::to_string(status)
                };
                match serialized {
                    Ok(json_str) => json_str,
                    Err(e) => {
                        tracing::error!("Failed to serialize status line: {}", e);
                        status.render()
                    }
                }
            }
        }
    }
}

impl StatusSink for StdoutSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, status: Status) {
        println!("{}", self.format_line(&status));
    }
}
