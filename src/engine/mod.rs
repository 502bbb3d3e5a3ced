//! Workflow engine invocation

pub mod command;
pub mod response;

use async_trait::async_trait;
pub use command::EngineCommand;
pub use response::{EngineError, ProcessOutcome};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Trait for engine execution - allows for different implementations
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Run a command to completion and report how it ended
    async fn run(&self, command: &EngineCommand) -> Result<ProcessOutcome, EngineError>;
}

/// Engine that runs commands as child processes
///
/// The child inherits stdout and stderr so the engine's own progress output
/// reaches the terminal.
#[derive(Debug, Clone, Default)]
pub struct SubprocessEngine {
    /// Timeout in seconds, `None` waits indefinitely
    timeout_secs: Option<u64>,
}

impl SubprocessEngine {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self { timeout_secs }
    }
}

#[async_trait]
impl WorkflowEngine for SubprocessEngine {
    /// # Errors
    /// Returns `EngineError` if:
    /// - The executable cannot be spawned
    /// - The command outlives the configured timeout (the child is killed)
    ///
    /// A non-zero exit is not an error here; it is reported in the outcome.
    async fn run(&self, command: &EngineCommand) -> Result<ProcessOutcome, EngineError> {
        debug!("Spawning engine subprocess: {}", command);

        let mut child = Command::new(&command.program);
        child.args(&command.args).kill_on_drop(true);

        let status = match self.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), child.status())
                .await
                .map_err(|_| EngineError::Timeout(secs))?,
            None => child.status().await,
        }
        .map_err(|source| EngineError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        let outcome = ProcessOutcome::from(status);
        match outcome.exit_code {
            Some(0) => debug!("{} exited successfully", command.program),
            Some(code) => warn!("{} exited with code {}", command.program, code),
            None => warn!("{} was terminated by a signal", command.program),
        }

        Ok(outcome)
    }
}
