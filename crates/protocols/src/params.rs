//! Parameter and result types for position-manager writes.

use alloy_primitives::{Address, B256, U256};
use vol_lp_domain::{NftId, TickRange};

/// Largest value the `collect` call accepts per token.
pub const MAX_COLLECT: u128 = u128::MAX;

/// Parameters for removing liquidity from a position.
#[derive(Debug, Clone)]
pub struct DecreaseLiquidityParams {
    /// Position to drain.
    pub nft_id: NftId,
    /// Liquidity units to remove.
    pub liquidity: u128,
    /// Minimum token0 out.
    pub amount0_min: U256,
    /// Minimum token1 out.
    pub amount1_min: U256,
    /// Unix seconds after which the call reverts.
    pub deadline: u64,
}

impl DecreaseLiquidityParams {
    /// Removes all of `liquidity` with no output floor.
    pub fn full(nft_id: NftId, liquidity: u128, deadline: u64) -> Self {
        Self {
            nft_id,
            liquidity,
            amount0_min: U256::ZERO,
            amount1_min: U256::ZERO,
            deadline,
        }
    }
}

/// Parameters for sweeping owed tokens out of a position.
#[derive(Debug, Clone)]
pub struct CollectParams {
    pub nft_id: NftId,
    pub recipient: Address,
    pub amount0_max: u128,
    pub amount1_max: u128,
}

impl CollectParams {
    /// Collects everything owed to `recipient`.
    pub fn everything(nft_id: NftId, recipient: Address) -> Self {
        Self {
            nft_id,
            recipient,
            amount0_max: MAX_COLLECT,
            amount1_max: MAX_COLLECT,
        }
    }
}

/// Parameters for minting a new position. `token0 < token1` must hold.
#[derive(Debug, Clone)]
pub struct MintParams {
    pub token0: Address,
    pub token1: Address,
    /// Fee tier in hundredths of a bip.
    pub fee_tier: u32,
    pub range: TickRange,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    /// Unix seconds after which the call reverts.
    pub deadline: u64,
}

/// Confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

impl TxReceipt {
    pub fn new(tx_hash: B256, block_number: Option<u64>, gas_used: u64) -> Self {
        Self {
            tx_hash,
            block_number,
            gas_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_everything_uses_max() {
        let params = CollectParams::everything(NftId::from(3), Address::ZERO);
        assert_eq!(params.amount0_max, u128::MAX);
        assert_eq!(params.amount1_max, u128::MAX);
    }

    #[test]
    fn test_full_decrease_has_no_floor() {
        let params = DecreaseLiquidityParams::full(NftId::from(3), 500, 1_700_000_000);
        assert_eq!(params.liquidity, 500);
        assert!(params.amount0_min.is_zero());
        assert!(params.amount1_min.is_zero());
    }
}
