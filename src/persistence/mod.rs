//! Persistence layer for run history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

use crate::core::StageState;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Summary of one `run` invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// Sample sheet the run was started with
    pub sample_sheet: String,

    /// State the runner ended in
    pub state: StageState,

    /// Mapping output, if mapping got that far
    pub mapped_files: Option<String>,

    /// Error that ended the run, if any
    pub error: Option<String>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run ended
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    /// Start a summary for a new run
    pub fn start(sample_sheet: &Path) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            sample_sheet: sample_sheet.display().to_string(),
            state: StageState::Initialized,
            mapped_files: None,
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Close the summary with the runner's final state
    pub fn finish(&mut self, state: StageState, mapped_files: Option<&Path>, error: Option<String>) {
        self.state = state;
        self.mapped_files = mapped_files.map(|p| p.display().to_string());
        self.error = error;
        self.completed_at = Some(Utc::now());
    }

    pub fn succeeded(&self) -> bool {
        self.completed_at.is_some() && self.error.is_none()
    }
}

/// Trait for persistence backends
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Save a run
    async fn save_run(&self, run: &RunSummary) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>>;

    /// List the most recent runs, newest first
    async fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>>;
}

/// In-memory persistence (for testing or `--no-history` runs)
pub struct InMemoryPersistence {
    runs: tokio::sync::RwLock<std::collections::HashMap<Uuid, RunSummary>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self {
            runs: tokio::sync::RwLock::new(std::collections::HashMap::new()),
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        let mut runs = self.runs.write().await;
        runs.insert(run.run_id, run.clone());
        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let runs = self.runs.read().await;
        Ok(runs.get(&run_id).cloned())
    }

    async fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let mut result: Vec<RunSummary> = runs.values().cloned().collect();
        result.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        result.truncate(limit);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_summary_lifecycle() {
        let mut summary = RunSummary::start(Path::new("samples.tsv"));
        assert!(!summary.succeeded());

        summary.finish(
            StageState::Mapped,
            Some(Path::new("results/recalibrated.tsv")),
            Some("annotate stage failed (exit code 1)".to_string()),
        );
        assert!(!summary.succeeded());
        assert_eq!(summary.mapped_files.as_deref(), Some("results/recalibrated.tsv"));

        summary.finish(StageState::Annotated, None, None);
        assert!(summary.succeeded());
    }

    #[tokio::test]
    async fn test_in_memory_newest_first() {
        let store = InMemoryPersistence::new();

        let mut older = RunSummary::start(Path::new("a.tsv"));
        older.started_at = Utc::now() - Duration::hours(1);
        let newer = RunSummary::start(Path::new("b.tsv"));

        store.save_run(&older).await.unwrap();
        store.save_run(&newer).await.unwrap();

        let runs = store.list_runs(10).await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].sample_sheet, "b.tsv");

        let runs = store.list_runs(1).await.unwrap();
        assert_eq!(runs.len(), 1);

        let loaded = store.load_run(older.run_id).await.unwrap().unwrap();
        assert_eq!(loaded, older);
    }
}
