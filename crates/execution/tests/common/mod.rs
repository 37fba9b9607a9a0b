//! In-memory chain and forecast doubles shared by the integration tests.
#![allow(dead_code)]

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vol_lp_data::{ForecastError, VolatilityForecaster, resolve_pair};
use vol_lp_domain::{ForecastResult, NftId, Position, RiskLevel};
use vol_lp_execution::config::{ChainSettings, EngineConfig, SecretConfig};
use vol_lp_execution::error::RebalanceError;
use vol_lp_execution::strategy::ChainConnector;
use vol_lp_protocols::uniswap::addresses::SEPOLIA;
use vol_lp_protocols::{
    CollectParams, DecreaseLiquidityParams, MintParams, PositionManagerClient, ProtocolError,
    TxReceipt,
};

pub const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const SEPOLIA_CHAIN: u64 = 11_155_111;

pub fn owner() -> Address {
    Address::repeat_byte(0xAA)
}

pub fn sepolia_secrets() -> SecretConfig {
    sepolia_secrets_with(&[])
}

/// Sepolia secrets plus extra keys such as address overrides.
pub fn sepolia_secrets_with(extra: &[(&str, String)]) -> SecretConfig {
    let mut map = HashMap::from([
        ("privateKey".to_string(), TEST_KEY.to_string()),
        ("providerUrl".to_string(), "http://localhost:8545".to_string()),
        ("chainId".to_string(), SEPOLIA_CHAIN.to_string()),
    ]);
    for (key, value) in extra {
        map.insert((*key).to_string(), value.clone());
    }
    SecretConfig::from_map(&map)
}

pub fn position(id: u64, liquidity: u128) -> Position {
    Position {
        nft_id: NftId::from(id),
        token0: SEPOLIA.usdc,
        token1: SEPOLIA.uni,
        fee_tier: 3000,
        tick_lower: -600,
        tick_upper: 600,
        liquidity,
        tokens_owed0: 5,
        tokens_owed1: 9,
    }
}

/// Every call the engine made, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DecreaseLiquidity(NftId),
    Collect(NftId),
    Approve(Address, U256),
    SubmitMint(MintCall),
    Confirm(B256),
}

/// Comparable view of a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintCall {
    pub token0: Address,
    pub token1: Address,
    pub lower: i32,
    pub upper: i32,
    pub amount0: U256,
    pub amount1: U256,
}

#[derive(Debug)]
struct State {
    positions: Vec<Position>,
    balances: HashMap<Address, U256>,
    allowances: HashMap<Address, U256>,
    calls: Vec<Call>,
    nonce: u64,
}

/// Chain double with configurable failures.
#[derive(Debug)]
pub struct MockClient {
    pub chain_id: u64,
    pub tick: i32,
    pub mint_reverts: bool,
    pub approve_fails: bool,
    pub confirm_times_out: bool,
    state: Mutex<State>,
}

impl MockClient {
    pub fn new(positions: Vec<Position>) -> Self {
        let rich = U256::from(10u64).pow(U256::from(24u64));
        Self {
            chain_id: SEPOLIA_CHAIN,
            tick: 1_020,
            mint_reverts: false,
            approve_fails: false,
            confirm_times_out: false,
            state: Mutex::new(State {
                positions,
                balances: HashMap::from([
                    (SEPOLIA.uni, rich),
                    (SEPOLIA.weth, rich),
                    (SEPOLIA.usdc, rich),
                ]),
                allowances: HashMap::new(),
                calls: Vec::new(),
                nonce: 0,
            }),
        }
    }

    pub fn reverting_mint(mut self) -> Self {
        self.mint_reverts = true;
        self
    }

    pub fn failing_approve(mut self) -> Self {
        self.approve_fails = true;
        self
    }

    pub fn stalled_confirmation(mut self) -> Self {
        self.confirm_times_out = true;
        self
    }

    pub fn on_chain(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_balance(self, token: Address, amount: U256) -> Self {
        self.state.lock().unwrap().balances.insert(token, amount);
        self
    }

    pub fn with_allowance(self, token: Address, amount: U256) -> Self {
        self.state.lock().unwrap().allowances.insert(token, amount);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn next_hash(&self, call: Call) -> B256 {
        let mut state = self.state.lock().unwrap();
        state.nonce += 1;
        state.calls.push(call);
        B256::left_padding_from(&state.nonce.to_be_bytes())
    }

    fn receipt(hash: B256) -> TxReceipt {
        TxReceipt::new(hash, Some(100), 21_000)
    }
}

#[async_trait]
impl PositionManagerClient for MockClient {
    fn owner(&self) -> Address {
        owner()
    }

    fn nft_manager(&self) -> Address {
        SEPOLIA.nft_manager
    }

    async fn chain_id(&self) -> Result<u64, ProtocolError> {
        Ok(self.chain_id)
    }

    async fn position_count(&self, _owner: Address) -> Result<u64, ProtocolError> {
        Ok(self.state.lock().unwrap().positions.len() as u64)
    }

    async fn position_id_at(&self, _owner: Address, index: u64) -> Result<NftId, ProtocolError> {
        self.state
            .lock()
            .unwrap()
            .positions
            .get(index as usize)
            .map(|p| p.nft_id)
            .ok_or_else(|| ProtocolError::rpc("tokenOfOwnerByIndex", "index out of bounds"))
    }

    async fn position(&self, nft_id: NftId) -> Result<Position, ProtocolError> {
        self.state
            .lock()
            .unwrap()
            .positions
            .iter()
            .find(|p| p.nft_id == nft_id)
            .cloned()
            .ok_or_else(|| ProtocolError::rpc("positions", "Invalid token ID"))
    }

    async fn current_tick(&self, _pool: Address) -> Result<i32, ProtocolError> {
        Ok(self.tick)
    }

    async fn decimals(&self, _token: Address) -> Result<u8, ProtocolError> {
        Ok(18)
    }

    async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256, ProtocolError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&token)
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(
        &self,
        token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, ProtocolError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .allowances
            .get(&token)
            .copied()
            .unwrap_or_default())
    }

    async fn approve(
        &self,
        token: Address,
        _spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, ProtocolError> {
        let hash = self.next_hash(Call::Approve(token, amount));
        if self.approve_fails {
            return Err(ProtocolError::Reverted {
                tx_hash: hash.to_string(),
                reason: "approve reverted".into(),
            });
        }
        self.state.lock().unwrap().allowances.insert(token, amount);
        Ok(Self::receipt(hash))
    }

    async fn decrease_liquidity(
        &self,
        params: &DecreaseLiquidityParams,
    ) -> Result<TxReceipt, ProtocolError> {
        let hash = self.next_hash(Call::DecreaseLiquidity(params.nft_id));
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.positions.iter_mut().find(|p| p.nft_id == params.nft_id) {
            p.liquidity = p.liquidity.saturating_sub(params.liquidity);
        }
        Ok(Self::receipt(hash))
    }

    async fn collect(&self, params: &CollectParams) -> Result<TxReceipt, ProtocolError> {
        let hash = self.next_hash(Call::Collect(params.nft_id));
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.positions.iter_mut().find(|p| p.nft_id == params.nft_id) {
            p.tokens_owed0 = 0;
            p.tokens_owed1 = 0;
        }
        Ok(Self::receipt(hash))
    }

    async fn submit_mint(&self, params: &MintParams) -> Result<B256, ProtocolError> {
        Ok(self.next_hash(Call::SubmitMint(MintCall {
            token0: params.token0,
            token1: params.token1,
            lower: params.range.lower(),
            upper: params.range.upper(),
            amount0: params.amount0_desired,
            amount1: params.amount1_desired,
        })))
    }

    async fn wait_for_confirmation(&self, tx_hash: B256) -> Result<TxReceipt, ProtocolError> {
        self.state.lock().unwrap().calls.push(Call::Confirm(tx_hash));
        if self.confirm_times_out {
            return Err(ProtocolError::Timeout {
                tx_hash: tx_hash.to_string(),
                timeout_seconds: 300,
            });
        }
        if self.mint_reverts {
            return Err(ProtocolError::Reverted {
                tx_hash: tx_hash.to_string(),
                reason: "STF".into(),
            });
        }
        Ok(Self::receipt(tx_hash))
    }
}

/// Hands out a pre-built client.
pub struct MockConnector(pub Arc<MockClient>);

impl ChainConnector for MockConnector {
    fn connect(
        &self,
        _settings: &ChainSettings,
        _engine: &EngineConfig,
    ) -> Result<Arc<dyn PositionManagerClient>, RebalanceError> {
        Ok(self.0.clone())
    }
}

/// Returns the same forecast every time, or fails.
pub struct FixedForecaster {
    pub predicted: Option<Decimal>,
}

impl FixedForecaster {
    pub fn new(predicted: Decimal) -> Self {
        Self {
            predicted: Some(predicted),
        }
    }

    pub fn unavailable() -> Self {
        Self { predicted: None }
    }
}

#[async_trait]
impl VolatilityForecaster for FixedForecaster {
    async fn fetch(
        &self,
        trading_pair: &str,
        horizon_days: u32,
    ) -> Result<ForecastResult, ForecastError> {
        let predicted = self
            .predicted
            .ok_or_else(|| ForecastError::Transport("connection refused".into()))?;
        let used = resolve_pair(trading_pair);
        Ok(ForecastResult {
            requested_pair: trading_pair.to_string(),
            trading_pair: used.to_string(),
            reported_pair: used.to_string(),
            horizon_days,
            annualized_volatility_pct: predicted * dec!(3.9),
            predicted_5d_volatility_pct: predicted,
            risk_level: RiskLevel::from_label(if predicted >= dec!(10) { "HIGH" } else { "LOW" }),
            realized_vol: dec!(1.2),
            returns_squared: dec!(0.3),
            timestamp: Utc::now(),
        })
    }
}
