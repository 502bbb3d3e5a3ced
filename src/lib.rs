//! sarek - helper tools for running the Sarek Nextflow pipeline

pub mod check;
pub mod cli;
pub mod core;
pub mod diagnostics;
pub mod engine;
pub mod persistence;

// Re-export commonly used types
pub use crate::check::{CheckError, CommandProbe, EnvironmentChecker, Tool, ToolProbe, ToolStatus};
pub use crate::core::{PipelineConfig, PipelineRunner, RunnerError, Settings, Stage, StageEvent, StageState};
pub use crate::diagnostics::{ConsoleSink, DiagnosticSink, MemorySink};
pub use crate::engine::{EngineCommand, EngineError, ProcessOutcome, SubprocessEngine, WorkflowEngine};
