use std::sync::Mutex;

use super::{Status, StatusSink};

/// Keeps every emitted line in memory. Used by tests and by callers that want to
/// post-process status output.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<Status>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<Status> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|s| match s {
                Status::Failure(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|s| s.message().contains(needle))
    }
}

impl StatusSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn emit(&self, status: Status) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(status);
        }
    }
}
