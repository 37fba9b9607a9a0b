use crate::entities::position::NftId;
use crate::enums::{RebalanceAction, ThresholdLevel};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Pair used when the invocation names none.
pub const DEFAULT_TOKEN_PAIR: &str = "LINKUSDT";

/// Inputs for a single invocation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceRequest {
    pub token_pair: String,
    pub action: RebalanceAction,
    pub threshold_level: ThresholdLevel,
    /// `None` means "use the configured pool".
    pub pool_address: Option<Address>,
    /// Explicit position to close; `None` targets the most recent one.
    pub nft_id: Option<NftId>,
}

impl RebalanceRequest {
    pub fn new(
        token_pair: impl Into<String>,
        action: RebalanceAction,
        threshold_level: ThresholdLevel,
    ) -> Self {
        Self {
            token_pair: token_pair.into(),
            action,
            threshold_level,
            pool_address: None,
            nft_id: None,
        }
    }

    #[must_use]
    pub fn with_pool(mut self, pool: Address) -> Self {
        self.pool_address = Some(pool);
        self
    }

    #[must_use]
    pub fn with_nft_id(mut self, nft_id: NftId) -> Self {
        self.nft_id = Some(nft_id);
        self
    }
}

impl Default for RebalanceRequest {
    fn default() -> Self {
        Self::new(
            DEFAULT_TOKEN_PAIR,
            RebalanceAction::default(),
            ThresholdLevel::default(),
        )
    }
}
