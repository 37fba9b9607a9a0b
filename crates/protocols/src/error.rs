use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("rpc call {call} failed: {message}")]
    Rpc { call: &'static str, message: String },

    #[error("transaction {tx_hash} reverted: {reason}")]
    Reverted { tx_hash: String, reason: String },

    #[error("transaction {tx_hash} not confirmed after {timeout_seconds}s")]
    Timeout {
        tx_hash: String,
        timeout_seconds: u64,
    },

    #[error("could not decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error("invalid signer key: {0}")]
    Signer(String),
}

impl ProtocolError {
    pub fn rpc(call: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Rpc {
            call,
            message: err.to_string(),
        }
    }

    /// True when the transaction reached the chain and failed there.
    pub fn is_on_chain_failure(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }
}
