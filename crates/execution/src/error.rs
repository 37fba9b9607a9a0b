//! Engine-level error taxonomy.

use alloy_primitives::{Address, B256};
use thiserror::Error;
use vol_lp_data::ForecastError;
use vol_lp_domain::math::RangeError;
use vol_lp_protocols::ProtocolError;

#[derive(Debug, Error)]
pub enum RebalanceError {
    /// Missing or malformed secret configuration. Raised before any chain
    /// interaction.
    #[error("configuration error: {0}")]
    Config(String),

    /// Forecast could not be fetched or failed validation. Raised before any
    /// chain interaction.
    #[error("volatility forecast unavailable: {0}")]
    ForecastUnavailable(#[from] ForecastError),

    #[error("no position to close: {0}")]
    NoPosition(String),

    #[error("approval of {token} failed: {source}")]
    Approval {
        token: Address,
        #[source]
        source: ProtocolError,
    },

    #[error("{step} failed: {reason}")]
    Chain { step: &'static str, reason: String },

    /// Mint was submitted but its receipt never arrived; it may still land.
    #[error("mint {tx_hash} submitted but not confirmed: {source}")]
    Unconfirmed {
        tx_hash: B256,
        #[source]
        source: ProtocolError,
    },

    #[error("invalid tick range: {0}")]
    InvalidRange(#[from] RangeError),
}

impl RebalanceError {
    /// Configuration error with a message naming the offending key.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Chain step failure; `step` names the call that failed.
    pub fn chain(step: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Chain {
            step,
            reason: err.to_string(),
        }
    }

    /// Short machine-friendly label, used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::ForecastUnavailable(_) => "ForecastUnavailable",
            Self::NoPosition(_) => "NoPositionError",
            Self::Approval { .. } => "ApprovalError",
            Self::Chain { .. } | Self::Unconfirmed { .. } => "ChainError",
            Self::InvalidRange(_) => "InvalidRangeError",
        }
    }

    /// Diagnostic detail kept apart from the display message: the error kind
    /// followed by the full source chain.
    pub fn detail(&self) -> String {
        let mut out = format!("{}: {self}", self.kind());
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
