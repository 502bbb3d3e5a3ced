//! CLI output formatting

use crate::{
    core::{StageEvent, StageState},
    persistence::RunSummary,
};
use console::Emoji;
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Format a runner state for display
pub fn format_state(state: StageState) -> String {
    match state {
        StageState::Initialized => style("INITIALIZED").dim().to_string(),
        StageState::Mapped => style("MAPPED").yellow().to_string(),
        StageState::Annotated => style("ANNOTATED").green().to_string(),
    }
}

/// Format a stage event for display
pub fn format_stage_event(event: &StageEvent) -> String {
    match event {
        StageEvent::StageStarted { stage, command } => format!(
            "{} {} {}",
            ROCKET,
            style(stage).cyan().bold(),
            style(command).dim()
        ),
        StageEvent::StageCompleted { stage, state } => format!(
            "{} {} → {}",
            CHECK,
            style(stage).green(),
            format_state(*state)
        ),
        StageEvent::StageFailed { stage, error } => {
            format!("{} {}: {}", CROSS, style(stage).red(), style(error).dim())
        }
    }
}

/// Format a run summary as one history line
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = if summary.succeeded() {
        CHECK
    } else if summary.completed_at.is_none() {
        SPINNER
    } else {
        CROSS
    };

    let mut line = format!(
        "{} {} - {} - {} - {}",
        status_icon,
        style(&summary.run_id.to_string()[..8]).dim(),
        style(summary.started_at.format("%Y-%m-%d %H:%M")).dim(),
        style(&summary.sample_sheet).bold(),
        format_state(summary.state)
    );
    if let Some(error) = &summary.error {
        line.push_str(&format!(" ({})", style(error).red()));
    }
    line
}

/// Format a duration as `1h 2m 3s`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Stage;
    use std::path::Path;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(42)), "42s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 2m 3s");
    }

    #[test]
    fn test_failed_event_mentions_error() {
        let line = format_stage_event(&StageEvent::StageFailed {
            stage: Stage::Map,
            error: "map stage failed (exit code 1)".to_string(),
        });
        assert!(line.contains("exit code 1"));
    }

    #[test]
    fn test_run_summary_line() {
        let mut summary = RunSummary::start(Path::new("tumour.tsv"));
        summary.finish(StageState::Annotated, None, None);
        let line = format_run_summary(&summary);
        assert!(line.contains("tumour.tsv"));
        assert!(line.contains(&summary.run_id.to_string()[..8]));
    }

    #[test]
    fn test_unfinished_run_is_marked_in_progress() {
        let summary = RunSummary::start(Path::new("tumour.tsv"));
        let line = format_run_summary(&summary);
        assert!(line.starts_with(&SPINNER.to_string()));
        assert!(!line.contains(&CROSS.to_string()));
    }
}
