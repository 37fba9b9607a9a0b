//! Progress events emitted during a run.

use super::state::LifecycleState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in the run an event was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Secret configuration checks.
    Config,
    /// Forecast fetch.
    Forecast,
    /// Threshold decision.
    Decision,
    /// A lifecycle state was entered.
    Lifecycle(LifecycleState),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => f.write_str("config"),
            Self::Forecast => f.write_str("forecast"),
            Self::Decision => f.write_str("decision"),
            Self::Lifecycle(state) => write!(f, "{}", state.as_str().to_ascii_lowercase()),
        }
    }
}

/// A `{stage, detail, timestamp}` record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Event ID.
    pub id: String,
    pub stage: Stage,
    /// Human-readable description.
    pub detail: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl LifecycleEvent {
    /// Stamps a new event with a fresh id and the current time.
    pub fn new(stage: Stage, detail: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            stage,
            detail: detail.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.stage,
            self.detail
        )
    }
}
