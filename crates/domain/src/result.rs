use crate::entities::{ForecastResult, NftId};
use crate::enums::RiskLevel;
use crate::value_objects::TickRange;
use alloy_primitives::B256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Volatility figures that led to the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilitySummary {
    /// Predicted 5-day volatility, percent.
    pub current: Decimal,
    /// Threshold it was compared against, percent.
    pub threshold: Decimal,
    pub level: RiskLevel,
    pub annualized: Decimal,
}

impl VolatilitySummary {
    pub fn from_forecast(forecast: &ForecastResult, threshold: Decimal) -> Self {
        Self {
            current: forecast.predicted_5d_volatility_pct,
            threshold,
            level: forecast.risk_level,
            annualized: forecast.annualized_volatility_pct,
        }
    }
}

/// What happened on chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceSummary {
    /// Positions already closed, in close order.
    pub closed_positions: Vec<NftId>,
    /// Mint transaction; set only once the mint is known to have landed.
    pub new_position_tx: Option<B256>,
    /// Mint that was submitted but not confirmed in time. It may still land.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_tx: Option<B256>,
    /// Range of the new position, `[lower, upper]`.
    pub tick_range: Option<TickRange>,
    /// Human-readable outcome.
    pub message: String,
}

/// Outcome of one invocation; built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceResult {
    /// False when any step failed.
    pub success: bool,
    /// Whether the decision called for action.
    pub rebalance_needed: bool,
    /// Pair the forecast was actually fetched for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_pair: Option<String>,
    /// Why nothing was done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<VolatilitySummary>,
    /// On-chain progress, present once chain mutation began.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rebalance: Option<RebalanceSummary>,
    /// Display message for failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Diagnostic detail for failures, kept apart from `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RebalanceResult {
    /// Forecast below threshold; nothing touched on chain.
    pub fn no_action(forecast: &ForecastResult, volatility: VolatilitySummary) -> Self {
        let reason = format!(
            "Predicted volatility {}% is below threshold {}%",
            volatility.current, volatility.threshold
        );
        Self {
            success: true,
            rebalance_needed: false,
            trading_pair: Some(forecast.trading_pair.clone()),
            reason: Some(reason),
            volatility: Some(volatility),
            rebalance: None,
            error: None,
            stack: None,
            timestamp: Utc::now(),
        }
    }

    /// Rebalance went through; `rebalance` describes what changed.
    pub fn executed(
        forecast: &ForecastResult,
        volatility: VolatilitySummary,
        rebalance: RebalanceSummary,
    ) -> Self {
        Self {
            success: true,
            rebalance_needed: true,
            trading_pair: Some(forecast.trading_pair.clone()),
            reason: None,
            volatility: Some(volatility),
            rebalance: Some(rebalance),
            error: None,
            stack: None,
            timestamp: Utc::now(),
        }
    }

    /// Bare failure; attach context with the `with_*` builders.
    pub fn failed(error: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            success: false,
            rebalance_needed: false,
            trading_pair: None,
            reason: None,
            volatility: None,
            rebalance: None,
            error: Some(error.into()),
            stack: Some(stack.into()),
            timestamp: Utc::now(),
        }
    }

    /// Records the decision that was reached before the failure.
    #[must_use]
    pub fn with_decision(
        mut self,
        forecast: &ForecastResult,
        volatility: VolatilitySummary,
        rebalance_needed: bool,
    ) -> Self {
        self.trading_pair = Some(forecast.trading_pair.clone());
        self.volatility = Some(volatility);
        self.rebalance_needed = rebalance_needed;
        self
    }

    /// Attaches on-chain progress; set once chain mutation has begun so the
    /// closed positions survive into the failure artifact.
    #[must_use]
    pub fn with_rebalance(mut self, rebalance: RebalanceSummary) -> Self {
        self.rebalance = Some(rebalance);
        self
    }

    /// Positions closed so far; empty when nothing was touched.
    pub fn closed_positions(&self) -> &[NftId] {
        self.rebalance
            .as_ref()
            .map(|r| r.closed_positions.as_slice())
            .unwrap_or_default()
    }
}
