//! Position lifecycle manager: reads, closes, approves and mints positions.
//!
//! Every write is confirmed before the next one is submitted, since all of
//! them share the signer's nonce. Nothing is rolled back on failure; the
//! caller reports what was already closed.

use crate::error::RebalanceError;
use crate::lifecycle::{LifecycleState, LifecycleTracker};
use alloy_primitives::{Address, B256, U256};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};
use vol_lp_domain::{NftId, Position};
use vol_lp_protocols::{
    CollectParams, DecreaseLiquidityParams, MintParams, PositionManagerClient, ProtocolError,
    TxReceipt,
};

/// What closing a position did on chain.
#[derive(Debug, Clone)]
pub struct ClosedPosition {
    /// State read just before closing.
    pub position: Position,
    /// `None` when the position held no liquidity.
    pub decrease_tx: Option<B256>,
    pub collect_tx: B256,
}

/// Drives one run's position writes and records each lifecycle step.
pub struct PositionLifecycleManager {
    client: Arc<dyn PositionManagerClient>,
    tracker: Arc<LifecycleTracker>,
    deadline_window: Duration,
}

impl PositionLifecycleManager {
    /// Creates a manager whose writes report to `tracker`.
    pub fn new(
        client: Arc<dyn PositionManagerClient>,
        tracker: Arc<LifecycleTracker>,
        deadline_window: Duration,
    ) -> Self {
        Self {
            client,
            tracker,
            deadline_window,
        }
    }

    /// Underlying chain client.
    pub fn client(&self) -> &Arc<dyn PositionManagerClient> {
        &self.client
    }

    /// Unix deadline `deadline_window` from now.
    pub fn deadline(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        now + self.deadline_window.as_secs()
    }

    /// All position NFTs held by `owner`, oldest first.
    pub async fn list_positions(&self, owner: Address) -> Result<Vec<NftId>, RebalanceError> {
        let count = self
            .client
            .position_count(owner)
            .await
            .map_err(|e| RebalanceError::chain("balanceOf", e))?;

        let mut ids = Vec::with_capacity(count as usize);
        for index in 0..count {
            let id = self
                .client
                .position_id_at(owner, index)
                .await
                .map_err(|e| RebalanceError::chain("tokenOfOwnerByIndex", e))?;
            ids.push(id);
        }
        info!(%owner, count, "positions listed");
        Ok(ids)
    }

    /// The position to close when none was named: the most recent one.
    pub async fn latest_position(&self, owner: Address) -> Result<NftId, RebalanceError> {
        self.list_positions(owner)
            .await?
            .last()
            .copied()
            .ok_or_else(|| RebalanceError::NoPosition(format!("{owner} holds no positions")))
    }

    /// On-chain state of one position.
    pub async fn position_info(&self, nft_id: NftId) -> Result<Position, RebalanceError> {
        self.client
            .position(nft_id)
            .await
            .map_err(|e| RebalanceError::chain("positions", e))
    }

    /// Drains the position's liquidity (if any) and sweeps everything owed
    /// to the signer. Both transactions are confirmed before returning.
    ///
    /// The decrease carries no output floor.
    pub async fn close_position(&self, nft_id: NftId) -> Result<ClosedPosition, RebalanceError> {
        self.tracker
            .transition(LifecycleState::Closing, format!("closing position {nft_id}"))
            .await;

        let position = self.position_info(nft_id).await?;

        let decrease_tx = if position.has_liquidity() {
            let params =
                DecreaseLiquidityParams::full(nft_id, position.liquidity, self.deadline());
            let receipt = self.client.decrease_liquidity(&params).await.map_err(|e| {
                error!(%nft_id, error = %e, "decreaseLiquidity failed");
                RebalanceError::chain("decreaseLiquidity", e)
            })?;
            info!(%nft_id, liquidity = position.liquidity, tx_hash = %receipt.tx_hash, "liquidity removed");
            Some(receipt.tx_hash)
        } else {
            info!(%nft_id, "position has no liquidity, skipping decrease");
            None
        };

        self.tracker
            .transition(
                LifecycleState::Collecting,
                format!("collecting owed tokens from {nft_id}"),
            )
            .await;

        let params = CollectParams::everything(nft_id, self.client.owner());
        let receipt = self.client.collect(&params).await.map_err(|e| {
            error!(%nft_id, error = %e, "collect failed");
            RebalanceError::chain("collect", e)
        })?;
        info!(%nft_id, tx_hash = %receipt.tx_hash, "position closed");

        Ok(ClosedPosition {
            position,
            decrease_tx,
            collect_tx: receipt.tx_hash,
        })
    }

    /// Makes sure `spender` may pull `amount` of `token` from the signer.
    ///
    /// The balance is checked first so an unfunded account fails before any
    /// approval is sent. Returns the approve receipt when one was needed.
    pub async fn ensure_allowance(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Option<TxReceipt>, RebalanceError> {
        if amount.is_zero() {
            return Ok(None);
        }
        let owner = self.client.owner();

        let (balance, allowance) = tokio::try_join!(
            self.client.balance_of(token, owner),
            self.client.allowance(token, owner, spender),
        )
        .map_err(|e| RebalanceError::chain("token state read", e))?;

        if balance < amount {
            warn!(%token, %balance, %amount, "insufficient balance");
            return Err(RebalanceError::chain(
                "balance check",
                format!("insufficient balance of {token}: have {balance}, need {amount}"),
            ));
        }
        if allowance >= amount {
            return Ok(None);
        }

        self.tracker
            .transition(
                LifecycleState::Approving,
                format!("approving {amount} of {token}"),
            )
            .await;
        let receipt = self
            .client
            .approve(token, spender, amount)
            .await
            .map_err(|source| RebalanceError::Approval { token, source })?;
        Ok(Some(receipt))
    }

    /// Checks allowances for both tokens, then submits the mint.
    ///
    /// Returns once the node accepts the transaction; use [`Self::confirm`]
    /// to wait for it.
    pub async fn mint_position(&self, params: &MintParams) -> Result<B256, RebalanceError> {
        let spender = self.client.nft_manager();
        self.ensure_allowance(params.token0, spender, params.amount0_desired)
            .await?;
        self.ensure_allowance(params.token1, spender, params.amount1_desired)
            .await?;

        self.tracker
            .transition(
                LifecycleState::Minting,
                format!(
                    "minting [{}, {}]",
                    params.range.lower(),
                    params.range.upper()
                ),
            )
            .await;

        self.client
            .submit_mint(params)
            .await
            .map_err(|e| RebalanceError::chain("mint", e))
    }

    /// Waits for the mint receipt. A timeout keeps the hash in the error
    /// since the transaction may still land.
    pub async fn confirm(&self, tx_hash: B256) -> Result<TxReceipt, RebalanceError> {
        self.client
            .wait_for_confirmation(tx_hash)
            .await
            .map_err(|e| match e {
                ProtocolError::Timeout { .. } => RebalanceError::Unconfirmed { tx_hash, source: e },
                other => RebalanceError::chain("mint confirmation", other),
            })
    }
}
