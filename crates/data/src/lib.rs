//! External data sources for the rebalancer.

pub mod forecast;

pub use forecast::{
    ForecastClientConfig, ForecastError, HttpForecastClient, VolatilityForecaster, resolve_pair,
};
