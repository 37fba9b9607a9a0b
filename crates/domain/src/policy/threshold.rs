use crate::entities::{ForecastResult, RebalanceRequest};
use crate::enums::{RebalanceAction, ThresholdLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maps each [`ThresholdLevel`] to a volatility percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub low: Decimal,
    pub moderate: Decimal,
    pub high: Decimal,
    pub extreme: Decimal,
}

impl ThresholdTable {
    pub fn percent(&self, level: ThresholdLevel) -> Decimal {
        match level {
            ThresholdLevel::Low => self.low,
            ThresholdLevel::Moderate => self.moderate,
            ThresholdLevel::High => self.high,
            ThresholdLevel::Extreme => self.extreme,
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            low: Decimal::new(2, 0),
            moderate: Decimal::new(5, 0),
            high: Decimal::new(10, 0),
            extreme: Decimal::new(20, 0),
        }
    }
}

/// Exit always acts; otherwise act when the 5-day forecast reaches the
/// threshold (inclusive).
pub fn should_rebalance(
    forecast: &ForecastResult,
    request: &RebalanceRequest,
    table: &ThresholdTable,
) -> bool {
    if request.action == RebalanceAction::ExitPosition {
        return true;
    }
    forecast.predicted_5d_volatility_pct >= table.percent(request.threshold_level)
}
