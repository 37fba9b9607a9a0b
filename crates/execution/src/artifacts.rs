//! Output artifacts for one run.
//!
//! Exactly one of three layouts is written per run:
//! `result.json` when nothing was needed, `rebalance-result.json` plus
//! `rebalance-report.txt` after a rebalance, or `error.json` on failure.

use crate::report;
use crate::strategy::RunOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use vol_lp_domain::{RebalanceResult, RebalanceSummary};

/// Written when the forecast stayed below threshold.
pub const NO_ACTION_FILE: &str = "result.json";
/// Full result of an executed rebalance.
pub const REBALANCE_RESULT_FILE: &str = "rebalance-result.json";
/// Human-readable companion of [`REBALANCE_RESULT_FILE`].
pub const REBALANCE_REPORT_FILE: &str = "rebalance-report.txt";
/// Written instead of the others when the run failed.
pub const ERROR_FILE: &str = "error.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Shape of `error.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorArtifact {
    pub success: bool,
    pub error: String,
    pub stack: String,
    pub timestamp: DateTime<Utc>,
    /// Present once chain mutation began, so closed positions are visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebalance: Option<RebalanceSummary>,
}

impl From<&RebalanceResult> for ErrorArtifact {
    fn from(result: &RebalanceResult) -> Self {
        Self {
            success: false,
            error: result.error.clone().unwrap_or_default(),
            stack: result.stack.clone().unwrap_or_default(),
            timestamp: result.timestamp,
            rebalance: result.rebalance.clone(),
        }
    }
}

/// Writes run artifacts under one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    /// Creates the output directory if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir).map_err(|source| ArtifactError::Io {
            path: output_dir.clone(),
            source,
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the files matching the outcome and returns their paths.
    pub fn write(&self, outcome: &RunOutcome) -> Result<Vec<PathBuf>, ArtifactError> {
        let result = &outcome.result;
        let paths = if !result.success {
            vec![self.write_error(result)?]
        } else if result.rebalance_needed {
            vec![
                self.write_json(REBALANCE_RESULT_FILE, "rebalance result", result)?,
                self.write_text(REBALANCE_REPORT_FILE, &report::render(outcome))?,
            ]
        } else {
            vec![self.write_json(NO_ACTION_FILE, "result", result)?]
        };

        for path in &paths {
            info!(path = %path.display(), "artifact written");
        }
        Ok(paths)
    }

    /// Writes `error.json` for a failed result. Also used directly when a
    /// run could not even be started.
    pub fn write_error(&self, result: &RebalanceResult) -> Result<PathBuf, ArtifactError> {
        let artifact = ErrorArtifact::from(result);
        self.write_json(ERROR_FILE, "error artifact", &artifact)
    }

    fn write_json<T: Serialize>(
        &self,
        file: &str,
        what: &'static str,
        value: &T,
    ) -> Result<PathBuf, ArtifactError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|source| ArtifactError::Json { what, source })?;
        self.write_text(file, &json)
    }

    fn write_text(&self, file: &str, contents: &str) -> Result<PathBuf, ArtifactError> {
        let path = self.output_dir.join(file);
        std::fs::write(&path, contents).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
