use crate::enums::RiskLevel;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A validated volatility forecast for one trading pair.
///
/// All percentage fields are non-negative. Only
/// `predicted_5d_volatility_pct` drives the rebalance decision; the rest is
/// carried through to the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    /// Pair the caller asked for, before fallback.
    pub requested_pair: String,
    /// Pair the forecast was actually fetched for.
    pub trading_pair: String,
    /// Pair label echoed by the forecast service.
    pub reported_pair: String,
    pub horizon_days: u32,
    pub annualized_volatility_pct: Decimal,
    pub predicted_5d_volatility_pct: Decimal,
    pub risk_level: RiskLevel,
    pub realized_vol: Decimal,
    pub returns_squared: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl ForecastResult {
    /// True when the requested pair was unsupported and a default was used.
    pub fn used_fallback_pair(&self) -> bool {
        !self.requested_pair.eq_ignore_ascii_case(&self.trading_pair)
    }
}
