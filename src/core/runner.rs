//! Stage runner - drives the engine through mapping and annotation

use crate::{
    core::{
        config::{PipelineConfig, Settings},
        state::{Stage, StageState},
    },
    diagnostics::DiagnosticSink,
    engine::{EngineCommand, EngineError, WorkflowEngine},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where Sarek leaves the recalibrated sample sheet, relative to the outdir
pub const MAPPED_SHEET: &str = "Preprocessing/Recalibrated/recalibrated.tsv";

/// Error types for stage execution
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Annotation needs mapped files")]
    MappingRequired,

    #[error("{stage} stage failed ({})", describe_exit(.exit_code))]
    StageExecutionFailed {
        stage: Stage,
        exit_code: Option<i32>,
    },

    #[error("Cannot run the {stage} stage from the {from} state")]
    InvalidTransition { stage: Stage, from: StageState },

    #[error("{stage} stage could not run: {source}")]
    Engine {
        stage: Stage,
        #[source]
        source: EngineError,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Events that can occur while a runner works
#[derive(Debug, Clone)]
pub enum StageEvent {
    StageStarted {
        stage: Stage,
        command: String,
    },
    StageCompleted {
        stage: Stage,
        state: StageState,
    },
    StageFailed {
        stage: Stage,
        error: String,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(StageEvent) + Send + Sync>;

/// Runs the Sarek stages for one sample sheet
pub struct PipelineRunner<E> {
    engine: E,
    settings: Settings,
    config: PipelineConfig,
    state: StageState,
    sink: Arc<dyn DiagnosticSink>,
    event_handlers: Vec<EventHandler>,
}

impl<E: WorkflowEngine> PipelineRunner<E> {
    pub fn new(
        engine: E,
        input_sheet_path: impl Into<PathBuf>,
        settings: Settings,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            engine,
            settings,
            config: PipelineConfig::new(input_sheet_path),
            state: StageState::Initialized,
            sink,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(StageEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit_event(&self, event: StageEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn mapped_files_path(&self) -> Option<&Path> {
        self.config.mapped_files_path()
    }

    /// Seed the runner with the output of a mapping done elsewhere
    ///
    /// Moves an `Initialized` runner straight to `Mapped`.
    pub fn resume_from_mapped(&mut self, mapped: impl Into<PathBuf>) -> Result<(), RunnerError> {
        if self.state != StageState::Initialized {
            return Err(RunnerError::InvalidTransition {
                stage: Stage::Map,
                from: self.state,
            });
        }
        self.config.record_mapped_files(mapped.into());
        self.state = StageState::Mapped;
        Ok(())
    }

    /// Command line for the mapping stage
    pub fn map_command(&self) -> EngineCommand {
        EngineCommand::run(&self.settings.nextflow, &self.settings.pipeline)
            .with_tools(&self.settings.tools)
            .with_option("sample", self.config.input_sheet_path().display().to_string())
            .with_option("outdir", self.settings.outdir.display().to_string())
    }

    /// Command line for the annotation stage
    pub fn annotate_command(&self, mapped: &Path) -> EngineCommand {
        EngineCommand::run(&self.settings.nextflow, &self.settings.annotate_pipeline)
            .with_tools(&self.settings.tools)
            .with_option("sample", mapped.display().to_string())
            .with_option("outdir", self.settings.outdir.display().to_string())
    }

    /// Run the mapping stage
    ///
    /// On a zero exit the mapped sheet location is recorded and the runner
    /// moves to `Mapped`. Any other outcome leaves the state untouched.
    pub async fn map(&mut self) -> Result<(), RunnerError> {
        self.print_input();

        if self.state != StageState::Initialized {
            return Err(RunnerError::InvalidTransition {
                stage: Stage::Map,
                from: self.state,
            });
        }

        let command = self.map_command();
        self.launch(Stage::Map, &command).await?;

        let mapped = self.settings.outdir.join(MAPPED_SHEET);
        info!("Mapping finished, mapped files at {}", mapped.display());
        self.config.record_mapped_files(mapped);
        self.state = StageState::Mapped;

        self.emit_event(StageEvent::StageCompleted {
            stage: Stage::Map,
            state: self.state,
        });
        Ok(())
    }

    /// Run the annotation stage
    ///
    /// Requires a recorded mapping output. Without one a critical message
    /// is reported and `MappingRequired` returned; the engine is not run.
    pub async fn annotate(&mut self) -> Result<(), RunnerError> {
        self.print_input();

        if self.state == StageState::Annotated {
            return Err(RunnerError::InvalidTransition {
                stage: Stage::Annotate,
                from: self.state,
            });
        }

        let mapped = match self.config.mapped_files_path() {
            Some(mapped) => mapped.to_path_buf(),
            None => {
                let err = RunnerError::MappingRequired;
                self.sink.critical(&err.to_string());
                return Err(err);
            }
        };

        let command = self.annotate_command(&mapped);
        self.launch(Stage::Annotate, &command).await?;

        info!("Annotation finished");
        self.state = StageState::Annotated;

        self.emit_event(StageEvent::StageCompleted {
            stage: Stage::Annotate,
            state: self.state,
        });
        Ok(())
    }

    fn print_input(&self) {
        self.sink.line(&format!(
            "Sample sheet: {}",
            self.config.input_sheet_path().display()
        ));
    }

    /// Run one engine command and map its exit status to a stage result
    async fn launch(&self, stage: Stage, command: &EngineCommand) -> Result<(), RunnerError> {
        debug!("Launching {} stage: {}", stage, command);
        self.emit_event(StageEvent::StageStarted {
            stage,
            command: command.to_string(),
        });

        let result = match self.engine.run(command).await {
            Ok(outcome) if outcome.success() => Ok(()),
            Ok(outcome) => Err(RunnerError::StageExecutionFailed {
                stage,
                exit_code: outcome.exit_code,
            }),
            Err(source) => Err(RunnerError::Engine { stage, source }),
        };

        if let Err(ref e) = result {
            warn!("{}", e);
            self.emit_event(StageEvent::StageFailed {
                stage,
                error: e.to_string(),
            });
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::engine::ProcessOutcome;
    use async_trait::async_trait;

    struct ExitWith(i32);

    #[async_trait]
    impl WorkflowEngine for ExitWith {
        async fn run(&self, _command: &EngineCommand) -> Result<ProcessOutcome, EngineError> {
            Ok(ProcessOutcome::from_code(self.0))
        }
    }

    fn runner(code: i32) -> PipelineRunner<ExitWith> {
        PipelineRunner::new(
            ExitWith(code),
            "samples.tsv",
            Settings::default(),
            Arc::new(MemorySink::new()),
        )
    }

    #[test]
    fn test_map_command_layout() {
        let runner = runner(0);
        assert_eq!(
            runner.map_command().to_string(),
            "nextflow run SciLifeLab/Sarek/main.nf --tools --sample samples.tsv --outdir results"
        );
    }

    #[test]
    fn test_annotate_command_uses_mapped_sheet() {
        let mut settings = Settings::default();
        settings.tools = vec!["snpEff".to_string(), "VEP".to_string()];
        let runner = PipelineRunner::new(
            ExitWith(0),
            "samples.tsv",
            settings,
            Arc::new(MemorySink::new()),
        );
        let command = runner.annotate_command(Path::new("results/mapped.tsv"));
        assert_eq!(
            command.args,
            vec![
                "run",
                "SciLifeLab/Sarek/annotate.nf",
                "--tools",
                "snpEff,VEP",
                "--sample",
                "results/mapped.tsv",
                "--outdir",
                "results",
            ]
        );
    }

    #[tokio::test]
    async fn test_map_twice_is_invalid() {
        let mut runner = runner(0);
        runner.map().await.unwrap();
        let err = runner.map().await.unwrap_err();
        assert!(matches!(
            err,
            RunnerError::InvalidTransition { stage: Stage::Map, from: StageState::Mapped }
        ));
    }

    #[tokio::test]
    async fn test_annotate_after_annotated_is_invalid() {
        let mut runner = runner(0);
        runner.map().await.unwrap();
        runner.annotate().await.unwrap();
        assert!(matches!(
            runner.annotate().await,
            Err(RunnerError::InvalidTransition { stage: Stage::Annotate, .. })
        ));
    }

    #[tokio::test]
    async fn test_resume_from_mapped() {
        let mut runner = runner(0);
        runner.resume_from_mapped("elsewhere/recalibrated.tsv").unwrap();
        assert_eq!(runner.state(), StageState::Mapped);
        runner.annotate().await.unwrap();
        assert_eq!(runner.state(), StageState::Annotated);
    }

    #[test]
    fn test_error_messages() {
        let err = RunnerError::StageExecutionFailed {
            stage: Stage::Map,
            exit_code: Some(2),
        };
        assert_eq!(err.to_string(), "map stage failed (exit code 2)");

        let err = RunnerError::StageExecutionFailed {
            stage: Stage::Annotate,
            exit_code: None,
        };
        assert_eq!(err.to_string(), "annotate stage failed (terminated by signal)");
    }
}
