//! Environment checks - verifies the pipeline's external tools are installed

pub mod probe;

pub use probe::{CommandProbe, Tool, ToolProbe, ToolStatus};

use crate::core::config::Settings;
use crate::diagnostics::DiagnosticSink;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// First line of every environment check
pub const GREETING: &str = "Checking the Sarek environment";

/// Extra line written in verbose mode
pub const VERBOSE_BANNER: &str = "VERBOSE: probing every required tool";

/// Error types for environment checks
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Required tools not installed: {}", .0.join(", "))]
    MissingTools(Vec<String>),
}

/// Checks that Nextflow and Singularity are available
pub struct EnvironmentChecker<P> {
    probe: P,
    sink: Arc<dyn DiagnosticSink>,
    nextflow: Tool,
    singularity: Tool,
}

impl<P: ToolProbe> EnvironmentChecker<P> {
    /// Create a checker probing the default executables on PATH
    pub fn new(probe: P, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            probe,
            sink,
            nextflow: Tool::nextflow("nextflow"),
            singularity: Tool::singularity("singularity"),
        }
    }

    /// Create a checker probing the executables named in the settings
    pub fn from_settings(probe: P, sink: Arc<dyn DiagnosticSink>, settings: &Settings) -> Self {
        Self {
            probe,
            sink,
            nextflow: Tool::nextflow(settings.nextflow.clone()),
            singularity: Tool::singularity(settings.singularity.clone()),
        }
    }

    /// Run the full environment check
    ///
    /// Both tools are probed even when the first one is missing, so the
    /// error lists everything that needs installing.
    pub async fn check_environment(&self, verbose: bool) -> Result<(), CheckError> {
        self.sink.line(GREETING);
        if verbose {
            self.sink.line(VERBOSE_BANNER);
        }

        let mut missing = Vec::new();
        if !self.check_nextflow().await {
            missing.push(self.nextflow.name.clone());
        }
        if !self.check_singularity().await {
            missing.push(self.singularity.name.clone());
        }

        if missing.is_empty() {
            info!("Environment check passed");
            Ok(())
        } else {
            Err(CheckError::MissingTools(missing))
        }
    }

    /// Whether Nextflow is installed
    pub async fn check_nextflow(&self) -> bool {
        self.check_tool(&self.nextflow).await
    }

    /// Whether Singularity is installed
    pub async fn check_singularity(&self) -> bool {
        self.check_tool(&self.singularity).await
    }

    async fn check_tool(&self, tool: &Tool) -> bool {
        match self.probe.probe(tool).await {
            ToolStatus::Present { version } => {
                info!(
                    "{} found ({})",
                    tool.name,
                    version.as_deref().unwrap_or("unknown version")
                );
                true
            }
            ToolStatus::Missing => {
                self.sink.critical(&format!("{} not installed", tool.name));
                false
            }
        }
    }
}
