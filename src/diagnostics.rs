//! Diagnostic sinks - where components write user-facing and critical output

use std::sync::Mutex;
use tracing::error;

/// Destination for the output a component produces
///
/// Every component receives a sink instead of printing or logging directly,
/// so output can be redirected or captured.
pub trait DiagnosticSink: Send + Sync {
    /// Write a plain user-facing line
    fn line(&self, message: &str);

    /// Report a critical condition
    fn critical(&self, message: &str);
}

/// Sink that prints lines to stdout and logs criticals through tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for ConsoleSink {
    fn line(&self, message: &str) {
        println!("{}", message);
    }

    fn critical(&self, message: &str) {
        error!("{}", message);
    }
}

/// Sink that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    criticals: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Critical messages reported so far
    pub fn criticals(&self) -> Vec<String> {
        self.criticals.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn line(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }

    fn critical(&self, message: &str) {
        if let Ok(mut criticals) = self.criticals.lock() {
            criticals.push(message.to_string());
        }
    }
}
