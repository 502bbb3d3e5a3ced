//! Engine outcome and error types

use thiserror::Error;

/// Error types for engine invocations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

/// How an engine process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl ProcessOutcome {
    pub fn from_code(code: i32) -> Self {
        Self {
            exit_code: Some(code),
        }
    }

    /// Only a zero exit code counts as success
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessOutcome {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            exit_code: status.code(),
        }
    }
}
