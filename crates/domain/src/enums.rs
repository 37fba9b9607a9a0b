use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// What the caller wants done with the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalanceAction {
    #[default]
    AutoOptimize,
    ReduceExposure,
    IncreaseExposure,
    ExitPosition,
}

impl RebalanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoOptimize => "auto_optimize",
            Self::ReduceExposure => "reduce_exposure",
            Self::IncreaseExposure => "increase_exposure",
            Self::ExitPosition => "exit_position",
        }
    }
}

impl FromStr for RebalanceAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto_optimize" => Ok(Self::AutoOptimize),
            "reduce_exposure" => Ok(Self::ReduceExposure),
            "increase_exposure" => Ok(Self::IncreaseExposure),
            "exit_position" => Ok(Self::ExitPosition),
            _ => Err(ParseEnumError {
                kind: "action",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RebalanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named volatility threshold; the numeric value lives in
/// [`crate::policy::threshold::ThresholdTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdLevel {
    Low,
    #[default]
    Moderate,
    High,
    Extreme,
}

impl ThresholdLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }
}

impl FromStr for ThresholdLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            "extreme" => Ok(Self::Extreme),
            _ => Err(ParseEnumError {
                kind: "threshold level",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ThresholdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk bucket reported by the forecast service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
    Unknown,
}

impl RiskLevel {
    /// Never fails: labels the service may add later map to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Self::Low,
            "MODERATE" => Self::Moderate,
            "HIGH" => Self::High,
            "EXTREME" => Self::Extreme,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Extreme => "EXTREME",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
