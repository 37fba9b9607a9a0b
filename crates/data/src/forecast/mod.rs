//! Volatility forecast intake.

pub mod error;
pub mod http;
pub mod payload;

pub use error::ForecastError;
pub use http::{DEFAULT_FORECAST_URL, ForecastClientConfig, HttpForecastClient};

use async_trait::async_trait;
use vol_lp_domain::ForecastResult;
use vol_lp_domain::entities::request::DEFAULT_TOKEN_PAIR;

/// Pairs the forecast service has models for.
pub const SUPPORTED_PAIRS: [&str; 6] = [
    "LINKUSDT",
    "UNIUSDT",
    "AAVEUSDT",
    "SUSHIUSDT",
    "1INCHUSDT",
    "UNIWETH",
];

/// Canonical supported pair for `requested`, or the default pair.
pub fn resolve_pair(requested: &str) -> &'static str {
    let wanted = requested.trim();
    SUPPORTED_PAIRS
        .iter()
        .find(|pair| pair.eq_ignore_ascii_case(wanted))
        .copied()
        .unwrap_or(DEFAULT_TOKEN_PAIR)
}

/// Source of volatility forecasts.
///
/// Implementations must report the pair they actually used in
/// [`ForecastResult::trading_pair`] and the caller's pair in
/// [`ForecastResult::requested_pair`].
#[async_trait]
pub trait VolatilityForecaster: Send + Sync {
    async fn fetch(
        &self,
        trading_pair: &str,
        horizon_days: u32,
    ) -> Result<ForecastResult, ForecastError>;
}
