use anyhow::{Context, Result};
use sarek::check::{CommandProbe, EnvironmentChecker};
use sarek::cli::commands::{AnnotateCommand, HistoryCommand, MapCommand, RunCommand, StageArgs, ValidateCommand};
use sarek::cli::output::*;
use sarek::cli::{Cli, Command};
use sarek::core::{PipelineRunner, RunnerError, Settings, Stage};
use sarek::diagnostics::{ConsoleSink, DiagnosticSink};
use sarek::engine::SubprocessEngine;
use sarek::persistence::{InMemoryPersistence, PersistenceBackend, RunSummary};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose when set
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sarek={}", default_level)));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let sink: Arc<dyn DiagnosticSink> = Arc::new(ConsoleSink::new());

    let result = match &cli.command {
        Command::Check(_) => check_environment(&cli, &load_settings(&cli, None)?, sink).await,
        Command::Run(cmd) => run_pipeline(cmd, &cli, sink).await,
        Command::Map(cmd) => map_only(cmd, &cli, sink).await,
        Command::Annotate(cmd) => annotate_only(cmd, &cli, sink).await,
        Command::History(cmd) => show_history(cmd).await,
        Command::Validate(cmd) => validate_settings(cmd, &cli),
    };

    // The only place the process is terminated on failure
    if let Err(e) = result {
        if !already_reported(&e) {
            eprintln!("{} {}", CROSS, style(format!("{:#}", e)).red());
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Errors the diagnostic sink has already shown as critical
fn already_reported(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<RunnerError>(), Some(RunnerError::MappingRequired))
}

/// Settings file plus command-line overrides
fn load_settings(cli: &Cli, overrides: Option<&StageArgs>) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(args) = overrides {
        args.apply(&mut settings);
        settings.validate().context("Invalid command-line overrides")?;
    }
    Ok(settings)
}

async fn check_environment(cli: &Cli, settings: &Settings, sink: Arc<dyn DiagnosticSink>) -> Result<()> {
    let checker = EnvironmentChecker::from_settings(CommandProbe, sink, settings);
    checker.check_environment(cli.verbose).await?;
    println!("{} Environment ready", CHECK);
    Ok(())
}

fn build_runner(
    sample: &Path,
    settings: Settings,
    sink: Arc<dyn DiagnosticSink>,
) -> PipelineRunner<SubprocessEngine> {
    let engine = SubprocessEngine::new(settings.timeout_secs);
    let mut runner = PipelineRunner::new(engine, sample, settings, sink);
    runner.add_event_handler(|event| println!("{}", format_stage_event(&event)));
    runner
}

async fn run_pipeline(cmd: &RunCommand, cli: &Cli, sink: Arc<dyn DiagnosticSink>) -> Result<()> {
    let settings = load_settings(cli, Some(&cmd.stage))?;
    check_environment(cli, &settings, sink.clone()).await?;

    // Opened before any stage so a broken history location fails fast
    let store: Box<dyn PersistenceBackend> = if cmd.no_history {
        Box::new(InMemoryPersistence::new())
    } else {
        open_store().await?
    };

    let mut runner = build_runner(&cmd.stage.sample, settings, sink);
    let mut summary = RunSummary::start(&cmd.stage.sample);
    let started = Instant::now();

    // An interrupted run stays in history as unfinished
    save_summary(store.as_ref(), &summary).await;

    let mut result = Ok(());
    while let Some(stage) = runner.state().next_stage() {
        result = match stage {
            Stage::Map => runner.map().await,
            Stage::Annotate if cmd.skip_annotate => break,
            Stage::Annotate => runner.annotate().await,
        };
        if result.is_err() {
            break;
        }
    }

    summary.finish(
        runner.state(),
        runner.mapped_files_path(),
        result.as_ref().err().map(|e| e.to_string()),
    );

    if save_summary(store.as_ref(), &summary).await && !cmd.no_history {
        println!(
            "{} Run saved to history (ID: {})",
            INFO,
            style(&summary.run_id.to_string()[..8]).dim()
        );
    }

    result?;
    println!(
        "\n{} {} finished {} in {}",
        CHECK,
        style(cmd.stage.sample.display()).bold(),
        format_state(runner.state()),
        format_duration(started.elapsed())
    );
    Ok(())
}

/// Save a summary; a history failure never masks the stage result
async fn save_summary(store: &dyn PersistenceBackend, summary: &RunSummary) -> bool {
    match store.save_run(summary).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save run {} to history: {:#}", summary.run_id, e);
            false
        }
    }
}

async fn map_only(cmd: &MapCommand, cli: &Cli, sink: Arc<dyn DiagnosticSink>) -> Result<()> {
    let settings = load_settings(cli, Some(&cmd.stage))?;
    check_environment(cli, &settings, sink.clone()).await?;

    let mut runner = build_runner(&cmd.stage.sample, settings, sink);
    runner.map().await?;

    if let Some(mapped) = runner.mapped_files_path() {
        println!("{} Mapped files: {}", INFO, style(mapped.display()).cyan());
    }
    Ok(())
}

async fn annotate_only(cmd: &AnnotateCommand, cli: &Cli, sink: Arc<dyn DiagnosticSink>) -> Result<()> {
    let settings = load_settings(cli, Some(&cmd.stage))?;
    check_environment(cli, &settings, sink.clone()).await?;

    let mut runner = build_runner(&cmd.stage.sample, settings, sink);
    if let Some(mapped) = &cmd.mapped {
        runner.resume_from_mapped(mapped)?;
    }
    runner.annotate().await?;
    Ok(())
}

#[cfg(feature = "sqlite")]
async fn open_store() -> Result<Box<dyn PersistenceBackend>> {
    Ok(Box::new(sarek::persistence::SqliteRunStore::with_default_path().await?))
}

#[cfg(not(feature = "sqlite"))]
async fn open_store() -> Result<Box<dyn PersistenceBackend>> {
    warn!("Built without the sqlite feature, run history is not kept between invocations");
    Ok(Box::new(InMemoryPersistence::new()))
}

async fn show_history(cmd: &HistoryCommand) -> Result<()> {
    let store = open_store().await?;
    let runs = store.list_runs(cmd.limit).await?;

    if cmd.json {
        let data = serde_json::json!({ "runs": runs });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("{} No runs found", INFO);
        return Ok(());
    }

    println!("{} Run history (showing latest {}):", INFO, cmd.limit);
    for summary in &runs {
        println!("  {}", format_run_summary(summary));
    }
    if runs.iter().any(|r| r.completed_at.is_none()) {
        warn!("Some runs never finished; the wrapper may have been interrupted");
    }

    Ok(())
}

fn validate_settings(cmd: &ValidateCommand, cli: &Cli) -> Result<()> {
    println!("{} Validating settings...", INFO);
    let settings = load_settings(cli, None)?;

    println!("{} Settings are valid!", CHECK);
    println!("  Pipeline: {}", style(&settings.pipeline).bold());
    println!("  Annotation: {}", style(&settings.annotate_pipeline).bold());
    println!("  Tools: {}", style(settings.tools.join(",")).cyan());
    println!("  Outdir: {}", style(settings.outdir.display()).dim());

    if cmd.json {
        println!("\n{}", serde_json::to_string_pretty(&settings)?);
    }
    Ok(())
}
