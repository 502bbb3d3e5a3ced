//! CLI command definitions

use crate::core::config::{parse_tools, Settings};
use clap::Args;
use std::path::PathBuf;

/// Options shared by every stage command
#[derive(Debug, Args, Clone)]
pub struct StageArgs {
    /// Sample sheet (TSV) fed to the pipeline
    #[arg(short, long)]
    pub sample: PathBuf,

    /// Comma-separated values for the pipeline's --tools flag
    #[arg(long)]
    pub tools: Option<String>,

    /// Directory the pipeline writes results to
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Nextflow executable
    #[arg(long)]
    pub nextflow: Option<String>,
}

impl StageArgs {
    /// Apply command-line overrides on top of file settings
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(tools) = &self.tools {
            settings.tools = parse_tools(tools);
        }
        if let Some(outdir) = &self.outdir {
            settings.outdir = outdir.clone();
        }
        if let Some(nextflow) = &self.nextflow {
            settings.nextflow = nextflow.clone();
        }
    }
}

/// Check the environment
#[derive(Debug, Args, Clone)]
pub struct CheckCommand {}

/// Run the whole pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Stop after mapping
    #[arg(long)]
    pub skip_annotate: bool,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,
}

/// Run the mapping stage
#[derive(Debug, Args, Clone)]
pub struct MapCommand {
    #[command(flatten)]
    pub stage: StageArgs,
}

/// Run the annotation stage
#[derive(Debug, Args, Clone)]
pub struct AnnotateCommand {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Mapped sample sheet produced by an earlier mapping run
    #[arg(long)]
    pub mapped: Option<PathBuf>,
}

/// Show run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Validate the settings file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_settings() {
        let args = StageArgs {
            sample: PathBuf::from("s.tsv"),
            tools: Some("Manta".to_string()),
            outdir: Some(PathBuf::from("/scratch/out")),
            nextflow: None,
        };
        let mut settings = Settings::default();
        args.apply(&mut settings);
        assert_eq!(settings.tools, vec!["Manta"]);
        assert_eq!(settings.outdir, PathBuf::from("/scratch/out"));
        assert_eq!(settings.nextflow, "nextflow");
    }
}
