//! Wire format of the forecast service and its validation.
//!
//! Every field is optional on the wire so that a missing value produces a
//! precise error instead of a generic deserialization failure. Nothing from
//! the payload reaches the domain before it has been checked here.

use super::error::ForecastError;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use vol_lp_domain::{ForecastResult, RiskLevel};

#[derive(Debug, Serialize)]
pub struct ForecastRequestBody {
    /// Horizon, string-encoded as the service expects.
    pub days: String,
}

impl ForecastRequestBody {
    pub fn new(horizon_days: u32) -> Self {
        Self {
            days: horizon_days.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub prediction: Option<PredictionPayload>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionPayload {
    pub trading_pair: Option<String>,
    pub annualized_volatility: Option<f64>,
    pub predicted_volatility_5d: Option<f64>,
    pub volatility_level: Option<String>,
    pub features: Option<FeaturesPayload>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeaturesPayload {
    pub realized_vol: Option<f64>,
    pub returns_squared: Option<f64>,
}

impl ForecastResponse {
    /// Validates the payload and converts it into a [`ForecastResult`].
    pub fn into_forecast(
        self,
        requested_pair: &str,
        trading_pair: &str,
        horizon_days: u32,
    ) -> Result<ForecastResult, ForecastError> {
        if self.success == Some(false) {
            return Err(ForecastError::Rejected(
                self.message.unwrap_or_else(|| "no message".to_string()),
            ));
        }
        let prediction = self
            .prediction
            .ok_or_else(|| missing("prediction"))?;
        let features = prediction
            .features
            .ok_or_else(|| missing("prediction.features"))?;

        let predicted = percentage(
            "prediction.predicted_volatility_5d",
            prediction.predicted_volatility_5d,
        )?;
        let annualized = percentage(
            "prediction.annualized_volatility",
            prediction.annualized_volatility,
        )?;
        let realized_vol = percentage("prediction.features.realized_vol", features.realized_vol)?;
        let returns_squared = percentage(
            "prediction.features.returns_squared",
            features.returns_squared,
        )?;

        let level = prediction
            .volatility_level
            .ok_or_else(|| missing("prediction.volatility_level"))?;
        let timestamp = parse_timestamp(
            prediction
                .timestamp
                .as_deref()
                .ok_or_else(|| missing("prediction.timestamp"))?,
        )?;

        Ok(ForecastResult {
            requested_pair: requested_pair.to_string(),
            trading_pair: trading_pair.to_string(),
            reported_pair: prediction
                .trading_pair
                .unwrap_or_else(|| trading_pair.to_string()),
            horizon_days,
            annualized_volatility_pct: annualized,
            predicted_5d_volatility_pct: predicted,
            risk_level: RiskLevel::from_label(&level),
            realized_vol,
            returns_squared,
            timestamp,
        })
    }
}

fn missing(field: &str) -> ForecastError {
    ForecastError::Malformed(format!("missing field {field}"))
}

/// Finite, non-negative, representable as `Decimal`.
fn percentage(field: &str, value: Option<f64>) -> Result<Decimal, ForecastError> {
    let value = value.ok_or_else(|| missing(field))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ForecastError::Malformed(format!(
            "{field} must be a finite non-negative number, got {value}"
        )));
    }
    Decimal::from_f64(value)
        .map(|d| d.normalize())
        .ok_or_else(|| ForecastError::Malformed(format!("{field} out of range: {value}")))
}

/// RFC 3339, or a naive ISO timestamp which is taken as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ForecastError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| ForecastError::Malformed(format!("bad timestamp {raw:?}: {e}")))
}
