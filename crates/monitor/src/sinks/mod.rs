pub mod memory;
pub mod stdout;

pub use memory::MemorySink;
pub use stdout::StdoutSink;

use serde::Serialize;

/// One human-readable status line emitted by a manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum Status {
    Success(String),
    Failure(String),
    Info(String),
    /// Section heading, printed after a blank line.
    Heading(String),
    /// Free-form detail line, printed as-is.
    Detail(String),
}

impl Status {
    pub fn message(&self) -> &str {
        match self {
            Status::Success(m)
            | Status::Failure(m)
            | Status::Info(m)
            | Status::Heading(m)
            | Status::Detail(m) => m,
        }
    }

    /// Text rendering used by the stdout sink.
    pub fn render(&self) -> String {
        match self {
            Status::Success(m) => format!("✓ {}", m),
            Status::Failure(m) => format!("✗ {}", m),
            Status::Info(m) => format!("ℹ️ {}", m),
            Status::Heading(m) => format!("\n{}", m),
            Status::Detail(m) => m.clone(),
        }
    }
}

/// Destination for status lines.
pub trait StatusSink: Send + Sync {
    fn name(&self) -> &str;
    fn emit(&self, status: Status);

    fn success(&self, message: String) {
        self.emit(Status::Success(message));
    }

    fn failure(&self, message: String) {
        self.emit(Status::Failure(message));
    }

    fn info(&self, message: String) {
        self.emit(Status::Info(message));
    }

    fn heading(&self, message: String) {
        self.emit(Status::Heading(message));
    }

    fn detail(&self, message: String) {
        self.emit(Status::Detail(message));
    }
}
