//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{AnnotateCommand, CheckCommand, HistoryCommand, MapCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Helper tools for the Sarek Nextflow pipeline
#[derive(Debug, Parser, Clone)]
#[command(name = "sarek")]
#[command(author = "Sarek Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Helper tools for running the Sarek Nextflow pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to settings YAML file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Check that Nextflow and Singularity are installed
    Check(CheckCommand),

    /// Check the environment, then map and annotate a sample sheet
    Run(RunCommand),

    /// Run the mapping stage only
    Map(MapCommand),

    /// Run the annotation stage only
    Annotate(AnnotateCommand),

    /// Show recent runs
    History(HistoryCommand),

    /// Validate a settings file
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
