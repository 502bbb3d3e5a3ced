//! Core domain models for the stage runner
//!
//! This module defines the runner's configuration, its state machine and
//! the runner that drives the engine through the mapping and annotation
//! stages.

pub mod config;
pub mod runner;
pub mod state;

pub use config::{PipelineConfig, Settings};
pub use runner::{PipelineRunner, RunnerError, StageEvent};
pub use state::{Stage, StageState};
