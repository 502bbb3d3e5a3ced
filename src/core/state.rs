//! Runner state models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stages the runner can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Alignment and preprocessing
    Map,
    /// Variant annotation
    Annotate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Map => write!(f, "map"),
            Stage::Annotate => write!(f, "annotate"),
        }
    }
}

/// Where a runner is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageState {
    /// Input sheet known, nothing mapped yet
    Initialized,
    /// Mapping succeeded and its output is recorded
    Mapped,
    /// Annotation finished
    Annotated,
}

impl StageState {
    /// The stage that moves the runner forward from this state
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            StageState::Initialized => Some(Stage::Map),
            StageState::Mapped => Some(Stage::Annotate),
            StageState::Annotated => None,
        }
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageState::Initialized => write!(f, "Initialized"),
            StageState::Mapped => write!(f, "Mapped"),
            StageState::Annotated => write!(f, "Annotated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_progression() {
        assert_eq!(StageState::Initialized.next_stage(), Some(Stage::Map));
        assert_eq!(StageState::Mapped.next_stage(), Some(Stage::Annotate));
        assert_eq!(StageState::Annotated.next_stage(), None);
    }
}
