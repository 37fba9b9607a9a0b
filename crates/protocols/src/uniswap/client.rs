//! Uniswap V3 position manager client over an alloy provider.
//!
//! Reads go through `eth_call`; writes are signed by the local wallet and
//! confirmed by polling for the receipt, so every confirmed write has
//! status 1 or surfaces as [`ProtocolError::Reverted`].

use crate::error::ProtocolError;
use crate::params::{CollectParams, DecreaseLiquidityParams, MintParams, TxReceipt};
use crate::PositionManagerClient;
use alloy::network::EthereumWallet;
use alloy::primitives::aliases::{I24, U24};
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use vol_lp_domain::{NftId, Position};

use super::contracts::{IERC20, INonfungiblePositionManager, IUniswapV3Pool};

/// Timing knobs for write confirmation.
#[derive(Debug, Clone, Copy)]
pub struct ClientOptions {
    /// Give up waiting for a receipt after this long.
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            confirmation_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Signing client for one NonfungiblePositionManager deployment.
pub struct UniswapV3Client {
    provider: DynProvider,
    npm: INonfungiblePositionManager::INonfungiblePositionManagerInstance<DynProvider>,
    owner: Address,
    nft_manager: Address,
    options: ClientOptions,
}

impl UniswapV3Client {
    /// Builds a wallet-backed HTTP provider. No network traffic happens here.
    pub fn connect(
        rpc_url: &str,
        private_key: &str,
        nft_manager: Address,
        options: ClientOptions,
    ) -> Result<Self, ProtocolError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ProtocolError::Signer(format!("{e}")))?;
        let owner = signer.address();
        let url = rpc_url
            .parse()
            .map_err(|e| ProtocolError::rpc("connect", format!("bad provider url: {e}")))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        info!(%owner, %nft_manager, "position manager client ready");

        Ok(Self {
            npm: INonfungiblePositionManager::new(nft_manager, provider.clone()),
            provider,
            owner,
            nft_manager,
            options,
        })
    }

    fn erc20(&self, token: Address) -> IERC20::IERC20Instance<DynProvider> {
        IERC20::new(token, self.provider.clone())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt, ProtocolError> {
        let start = tokio::time::Instant::now();

        loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if !receipt.status() {
                        return Err(ProtocolError::Reverted {
                            tx_hash: tx_hash.to_string(),
                            reason: "transaction reverted on-chain".into(),
                        });
                    }
                    info!(
                        tx_hash = %tx_hash,
                        gas_used = receipt.gas_used,
                        "transaction confirmed"
                    );
                    return Ok(TxReceipt::new(
                        tx_hash,
                        receipt.block_number,
                        receipt.gas_used,
                    ));
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, tx_hash = %tx_hash, "receipt poll error, retrying");
                }
            }

            if start.elapsed() >= self.options.confirmation_timeout {
                return Err(ProtocolError::Timeout {
                    tx_hash: tx_hash.to_string(),
                    timeout_seconds: self.options.confirmation_timeout.as_secs(),
                });
            }

            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

fn to_u64(value: U256, what: &'static str) -> Result<u64, ProtocolError> {
    u64::try_from(value).map_err(|e| ProtocolError::Decode {
        what,
        message: e.to_string(),
    })
}

fn to_i24(tick: i32) -> Result<I24, ProtocolError> {
    I24::try_from(tick).map_err(|e| ProtocolError::Decode {
        what: "tick",
        message: format!("{tick}: {e}"),
    })
}

#[async_trait]
impl PositionManagerClient for UniswapV3Client {
    fn owner(&self) -> Address {
        self.owner
    }

    fn nft_manager(&self) -> Address {
        self.nft_manager
    }

    async fn chain_id(&self) -> Result<u64, ProtocolError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ProtocolError::rpc("eth_chainId", e))
    }

    async fn position_count(&self, owner: Address) -> Result<u64, ProtocolError> {
        let count = self
            .npm
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ProtocolError::rpc("balanceOf", e))?;
        to_u64(count, "position count")
    }

    async fn position_id_at(&self, owner: Address, index: u64) -> Result<NftId, ProtocolError> {
        let id = self
            .npm
            .tokenOfOwnerByIndex(owner, U256::from(index))
            .call()
            .await
            .map_err(|e| ProtocolError::rpc("tokenOfOwnerByIndex", e))?;
        Ok(NftId::from(id))
    }

    async fn position(&self, nft_id: NftId) -> Result<Position, ProtocolError> {
        let raw = self
            .npm
            .positions(nft_id.as_u256())
            .call()
            .await
            .map_err(|e| ProtocolError::rpc("positions", e))?;

        debug!(%nft_id, liquidity = raw.liquidity, "position loaded");

        Ok(Position {
            nft_id,
            token0: raw.token0,
            token1: raw.token1,
            fee_tier: raw.fee.to::<u32>(),
            tick_lower: raw.tickLower.as_i32(),
            tick_upper: raw.tickUpper.as_i32(),
            liquidity: raw.liquidity,
            tokens_owed0: raw.tokensOwed0,
            tokens_owed1: raw.tokensOwed1,
        })
    }

    async fn current_tick(&self, pool: Address) -> Result<i32, ProtocolError> {
        let slot0 = IUniswapV3Pool::new(pool, self.provider.clone())
            .slot0()
            .call()
            .await
            .map_err(|e| ProtocolError::rpc("slot0", e))?;
        Ok(slot0.tick.as_i32())
    }

    async fn decimals(&self, token: Address) -> Result<u8, ProtocolError> {
        self.erc20(token)
            .decimals()
            .call()
            .await
            .map_err(|e| ProtocolError::rpc("decimals", e))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ProtocolError> {
        self.erc20(token)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ProtocolError::rpc("balanceOf", e))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ProtocolError> {
        self.erc20(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| ProtocolError::rpc("allowance", e))
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, ProtocolError> {
        let pending = self
            .erc20(token)
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| ProtocolError::rpc("approve", e))?;
        let tx_hash = *pending.tx_hash();
        info!(%token, %spender, %amount, tx_hash = %tx_hash, "approve submitted");
        self.wait_for_receipt(tx_hash).await
    }

    async fn decrease_liquidity(
        &self,
        params: &DecreaseLiquidityParams,
    ) -> Result<TxReceipt, ProtocolError> {
        let call = INonfungiblePositionManager::DecreaseLiquidityParams {
            tokenId: params.nft_id.as_u256(),
            liquidity: params.liquidity,
            amount0Min: params.amount0_min,
            amount1Min: params.amount1_min,
            deadline: U256::from(params.deadline),
        };
        let pending = self
            .npm
            .decreaseLiquidity(call)
            .send()
            .await
            .map_err(|e| ProtocolError::rpc("decreaseLiquidity", e))?;
        let tx_hash = *pending.tx_hash();
        info!(
            nft_id = %params.nft_id,
            liquidity = params.liquidity,
            tx_hash = %tx_hash,
            "decreaseLiquidity submitted"
        );
        self.wait_for_receipt(tx_hash).await
    }

    async fn collect(&self, params: &CollectParams) -> Result<TxReceipt, ProtocolError> {
        let call = INonfungiblePositionManager::CollectParams {
            tokenId: params.nft_id.as_u256(),
            recipient: params.recipient,
            amount0Max: params.amount0_max,
            amount1Max: params.amount1_max,
        };
        let pending = self
            .npm
            .collect(call)
            .send()
            .await
            .map_err(|e| ProtocolError::rpc("collect", e))?;
        let tx_hash = *pending.tx_hash();
        info!(nft_id = %params.nft_id, tx_hash = %tx_hash, "collect submitted");
        self.wait_for_receipt(tx_hash).await
    }

    async fn submit_mint(&self, params: &MintParams) -> Result<B256, ProtocolError> {
        let fee = U24::try_from(params.fee_tier).map_err(|e| ProtocolError::Decode {
            what: "fee tier",
            message: format!("{}: {e}", params.fee_tier),
        })?;
        let call = INonfungiblePositionManager::MintParams {
            token0: params.token0,
            token1: params.token1,
            fee,
            tickLower: to_i24(params.range.lower())?,
            tickUpper: to_i24(params.range.upper())?,
            amount0Desired: params.amount0_desired,
            amount1Desired: params.amount1_desired,
            amount0Min: params.amount0_min,
            amount1Min: params.amount1_min,
            recipient: params.recipient,
            deadline: U256::from(params.deadline),
        };
        let pending = self
            .npm
            .mint(call)
            .send()
            .await
            .map_err(|e| ProtocolError::rpc("mint", e))?;
        let tx_hash = *pending.tx_hash();
        info!(
            token0 = %params.token0,
            token1 = %params.token1,
            tick_lower = params.range.lower(),
            tick_upper = params.range.upper(),
            tx_hash = %tx_hash,
            "mint submitted"
        );
        Ok(tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<TxReceipt, ProtocolError> {
        self.wait_for_receipt(tx_hash).await
    }
}
