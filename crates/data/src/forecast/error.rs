use thiserror::Error;

/// Failures talking to the volatility forecast service.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("forecast service unreachable: {0}")]
    Transport(String),

    #[error("forecast service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("forecast service reported failure: {0}")]
    Rejected(String),

    #[error("malformed forecast payload: {0}")]
    Malformed(String),

    #[error("could not build forecast client: {0}")]
    Client(String),
}

impl ForecastError {
    /// Transport failures, throttling and server-side errors are worth
    /// another attempt; everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
