//! HTTP client for the volatility forecast service.
//!
//! One logical fetch is a POST of `{"days": "<n>"}`. Transport failures,
//! 429 and 5xx responses are retried with exponential backoff up to a fixed
//! number of attempts; anything else fails immediately.

use super::error::ForecastError;
use super::payload::{ForecastRequestBody, ForecastResponse};
use super::{VolatilityForecaster, resolve_pair};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use vol_lp_domain::ForecastResult;

pub const DEFAULT_FORECAST_URL: &str =
    "https://o9r0ju4pg2.execute-api.eu-north-1.amazonaws.com/dev/lipo_volatility_predict";

/// Connection settings for [`HttpForecastClient`].
#[derive(Debug, Clone)]
pub struct ForecastClientConfig {
    /// Endpoint receiving the POST.
    pub url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles afterwards.
    pub initial_backoff: Duration,
}

impl Default for ForecastClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FORECAST_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// Forecast client backed by the volatility prediction service.
pub struct HttpForecastClient {
    client: Client,
    config: ForecastClientConfig,
}

impl HttpForecastClient {
    /// Builds the HTTP client with the configured request timeout.
    pub fn new(config: ForecastClientConfig) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ForecastError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ForecastClientConfig {
        &self.config
    }

    /// Delay before attempt number `attempt` (1-based; the first is 0).
    fn backoff(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        self.config
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt - 2))
    }

    async fn fetch_once(&self, body: &ForecastRequestBody) -> Result<ForecastResponse, ForecastError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ForecastError::Transport(format!(
                        "timeout after {}s",
                        self.config.timeout.as_secs()
                    ))
                } else {
                    ForecastError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable body".to_string());
            return Err(ForecastError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ForecastResponse>()
            .await
            .map_err(|e| ForecastError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl VolatilityForecaster for HttpForecastClient {
    async fn fetch(
        &self,
        trading_pair: &str,
        horizon_days: u32,
    ) -> Result<ForecastResult, ForecastError> {
        let used_pair = resolve_pair(trading_pair);
        if !used_pair.eq_ignore_ascii_case(trading_pair.trim()) {
            warn!(
                requested = trading_pair,
                used = used_pair,
                "unsupported trading pair, using fallback"
            );
        }

        let body = ForecastRequestBody::new(horizon_days);
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            let delay = self.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.fetch_once(&body).await {
                Ok(response) => {
                    let forecast = response.into_forecast(trading_pair, used_pair, horizon_days)?;
                    info!(
                        pair = %forecast.trading_pair,
                        predicted_5d = %forecast.predicted_5d_volatility_pct,
                        annualized = %forecast.annualized_volatility_pct,
                        level = %forecast.risk_level,
                        "volatility forecast received"
                    );
                    return Ok(forecast);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(attempt, max_attempts = attempts, error = %e, "forecast fetch failed, retrying");
                    last_error = Some(e);
                }
                Err(e) => {
                    debug!(attempt, error = %e, "forecast fetch failed");
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ForecastError::Transport("no attempt made".into())))
    }
}
