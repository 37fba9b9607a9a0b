//! Chain adapters for concentrated-liquidity position managers.
//!
//! The [`PositionManagerClient`] trait is the seam between the rebalance
//! workflow and the chain: the Uniswap V3 adapter implements it over an
//! alloy provider, tests implement it in memory.

pub mod error;
pub mod params;
pub mod uniswap;

pub use error::ProtocolError;
pub use params::{CollectParams, DecreaseLiquidityParams, MintParams, TxReceipt};

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use vol_lp_domain::{NftId, Position};

#[async_trait]
pub trait PositionManagerClient: Send + Sync {
    /// Account that signs every write.
    fn owner(&self) -> Address;

    /// Address of the NonfungiblePositionManager, the approval spender.
    fn nft_manager(&self) -> Address;

    async fn chain_id(&self) -> Result<u64, ProtocolError>;

    async fn position_count(&self, owner: Address) -> Result<u64, ProtocolError>;

    async fn position_id_at(&self, owner: Address, index: u64) -> Result<NftId, ProtocolError>;

    async fn position(&self, nft_id: NftId) -> Result<Position, ProtocolError>;

    async fn current_tick(&self, pool: Address) -> Result<i32, ProtocolError>;

    async fn decimals(&self, token: Address) -> Result<u8, ProtocolError>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ProtocolError>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ProtocolError>;

    /// Submits `approve` and waits for the receipt.
    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, ProtocolError>;

    /// Submits `decreaseLiquidity` and waits for the receipt.
    async fn decrease_liquidity(
        &self,
        params: &DecreaseLiquidityParams,
    ) -> Result<TxReceipt, ProtocolError>;

    /// Submits `collect` and waits for the receipt.
    async fn collect(&self, params: &CollectParams) -> Result<TxReceipt, ProtocolError>;

    /// Submits `mint` and returns as soon as the node accepts it.
    async fn submit_mint(&self, params: &MintParams) -> Result<B256, ProtocolError>;

    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<TxReceipt, ProtocolError>;
}
