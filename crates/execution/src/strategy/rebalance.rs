//! Rebalance orchestration.
//!
//! One call to [`Rebalancer::run`] performs one invocation: validate
//! secrets, fetch the forecast, decide, and if needed close the current
//! position and mint a new one around the pool tick. Every failure is
//! turned into a `success = false` result; nothing escapes as an error.

use crate::config::{ChainSettings, EngineConfig, SecretConfig};
use crate::error::RebalanceError;
use crate::lifecycle::{LifecycleEvent, LifecycleState, LifecycleTracker, Stage};
use crate::strategy::connector::ChainConnector;
use crate::strategy::position_manager::PositionLifecycleManager;
use alloy_primitives::{Address, U256};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use vol_lp_data::VolatilityForecaster;
use vol_lp_domain::math::{compute_range, tick_spacing_for_fee, tick_to_human_price};
use vol_lp_domain::policy::{DepositAmounts, deposit_amounts, should_rebalance};
use vol_lp_domain::{
    Amount, ForecastResult, Position, RebalanceRequest, RebalanceResult, RebalanceSummary,
    VolatilitySummary,
};
use vol_lp_protocols::MintParams;

/// Chain-side facts gathered during a run, for the report.
#[derive(Debug, Clone)]
pub struct ChainSummary {
    pub chain_id: u64,
    /// Signer address; receives collected tokens and the new position.
    pub owner: Address,
    pub nft_manager: Address,
    pub pool: Address,
    /// Sorted mint pair, known once sizing reached the mint step.
    pub token0: Option<Address>,
    pub token1: Option<Address>,
    pub current_tick: Option<i32>,
    /// Human price of token0 in token1 at `current_tick`.
    pub current_price: Option<f64>,
    pub deposit: Option<DepositAmounts>,
    /// Desired mint amounts in token0/token1 order.
    pub mint_amounts: Option<(Amount, Amount)>,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: RebalanceResult,
    pub request: RebalanceRequest,
    /// Absent when the run failed before the forecast arrived.
    pub forecast: Option<ForecastResult>,
    /// Absent when the run never connected to the chain.
    pub chain: Option<ChainSummary>,
    /// Pre-close state of each closed position.
    pub closed: Vec<Position>,
    /// This run's progress events, in order.
    pub events: Vec<LifecycleEvent>,
    /// Lifecycle state the run ended in.
    pub state: LifecycleState,
}

/// Mutable scratch state; survives a failure so partial progress can be
/// reported.
#[derive(Default)]
struct RunState {
    forecast: Option<ForecastResult>,
    volatility: Option<VolatilitySummary>,
    rebalance_needed: bool,
    mutation_started: bool,
    summary: RebalanceSummary,
    chain: Option<ChainSummary>,
    closed: Vec<Position>,
}

/// Runs rebalance invocations; holds no state between them.
pub struct Rebalancer<F, C> {
    forecaster: F,
    connector: C,
    engine: EngineConfig,
    /// Subscriber hub; every run records into its own fork.
    progress: LifecycleTracker,
}

impl<F, C> Rebalancer<F, C>
where
    F: VolatilityForecaster,
    C: ChainConnector,
{
    /// Creates a rebalancer that fetches forecasts from `forecaster` and
    /// reaches the chain through `connector`.
    pub fn new(forecaster: F, connector: C, engine: EngineConfig) -> Self {
        Self {
            forecaster,
            connector,
            engine,
            progress: LifecycleTracker::new(),
        }
    }

    /// Receives the progress events of every run started after this call.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<LifecycleEvent> {
        self.progress.subscribe().await
    }

    /// Engine tunables used by every run.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Performs one invocation and returns its result. Never fails.
    pub async fn run(&self, request: &RebalanceRequest, secrets: &SecretConfig) -> RebalanceResult {
        self.run_detailed(request, secrets).await.result
    }

    /// Like [`Self::run`], also returning what the report needs.
    pub async fn run_detailed(
        &self,
        request: &RebalanceRequest,
        secrets: &SecretConfig,
    ) -> RunOutcome {
        info!(
            pair = %request.token_pair,
            action = %request.action,
            threshold = %request.threshold_level,
            nft_id = ?request.nft_id,
            "starting rebalance run"
        );

        let tracker = Arc::new(self.progress.fork());
        let mut state = RunState::default();
        let result = match self.execute(request, secrets, &tracker, &mut state).await {
            Ok(result) => result,
            Err(e) => {
                error!(kind = e.kind(), error = %e, "rebalance failed");
                tracker.fail(e.to_string()).await;
                failure_result(&e, &state)
            }
        };

        RunOutcome {
            result,
            request: request.clone(),
            forecast: state.forecast,
            chain: state.chain,
            closed: state.closed,
            events: tracker.events().await,
            state: tracker.state().await,
        }
    }

    async fn execute(
        &self,
        request: &RebalanceRequest,
        secrets: &SecretConfig,
        tracker: &Arc<LifecycleTracker>,
        state: &mut RunState,
    ) -> Result<RebalanceResult, RebalanceError> {
        let settings = secrets.validate(request.pool_address)?;
        tracker
            .record(
                Stage::Config,
                format!("chain {} pool {}", settings.chain_id, settings.pool),
            )
            .await;

        let forecast = self
            .forecaster
            .fetch(&request.token_pair, self.engine.horizon_days)
            .await?;
        if forecast.used_fallback_pair() {
            warn!(
                requested = %forecast.requested_pair,
                used = %forecast.trading_pair,
                "forecast fetched for fallback pair"
            );
        }
        tracker
            .record(
                Stage::Forecast,
                format!(
                    "{}: predicted 5d volatility {}% ({})",
                    forecast.trading_pair,
                    forecast.predicted_5d_volatility_pct,
                    forecast.risk_level
                ),
            )
            .await;

        let threshold = self.engine.thresholds.percent(request.threshold_level);
        let volatility = VolatilitySummary::from_forecast(&forecast, threshold);
        let needed = should_rebalance(&forecast, request, &self.engine.thresholds);
        state.forecast = Some(forecast.clone());
        state.volatility = Some(volatility.clone());
        state.rebalance_needed = needed;

        if !needed {
            let result = RebalanceResult::no_action(&forecast, volatility);
            tracker
                .record(Stage::Decision, result.reason.clone().unwrap_or_default())
                .await;
            info!(
                predicted = %forecast.predicted_5d_volatility_pct,
                threshold = %threshold,
                "no rebalance needed"
            );
            return Ok(result);
        }
        tracker
            .record(
                Stage::Decision,
                format!(
                    "rebalance needed: {}% vs threshold {}% ({})",
                    forecast.predicted_5d_volatility_pct, threshold, request.action
                ),
            )
            .await;

        self.rebalance(request, &settings, &forecast, volatility, tracker, state)
            .await
    }

    async fn rebalance(
        &self,
        request: &RebalanceRequest,
        settings: &ChainSettings,
        forecast: &ForecastResult,
        volatility: VolatilitySummary,
        tracker: &Arc<LifecycleTracker>,
        state: &mut RunState,
    ) -> Result<RebalanceResult, RebalanceError> {
        // Everything decidable from inputs alone is checked before any write.
        let vol = forecast.predicted_5d_volatility_pct;
        let deposit = deposit_amounts(request.action, vol, &self.engine.base_amounts);
        let pair = if deposit.is_zero() {
            None
        } else {
            tick_spacing_for_fee(self.engine.fee_tier)
                .map_err(|e| RebalanceError::config(e.to_string()))?;
            Some(settings.token_pair(&forecast.trading_pair)?)
        };

        let client = self.connector.connect(settings, &self.engine)?;
        let reported = client
            .chain_id()
            .await
            .map_err(|e| RebalanceError::chain("eth_chainId", e))?;
        if reported != settings.chain_id {
            return Err(RebalanceError::config(format!(
                "provider is on chain {reported}, configuration says {}",
                settings.chain_id
            )));
        }

        let owner = client.owner();
        state.chain = Some(ChainSummary {
            chain_id: settings.chain_id,
            owner,
            nft_manager: settings.nft_manager,
            pool: settings.pool,
            token0: None,
            token1: None,
            current_tick: None,
            current_price: None,
            deposit: None,
            mint_amounts: None,
        });

        let manager = PositionLifecycleManager::new(
            Arc::clone(&client),
            Arc::clone(tracker),
            self.engine.deadline_window,
        );

        let target = match request.nft_id {
            Some(id) => id,
            None => manager.latest_position(owner).await?,
        };

        state.mutation_started = true;
        let closed = manager.close_position(target).await?;
        state.summary.closed_positions.push(target);
        state.closed.push(closed.position);

        if let Some(chain) = state.chain.as_mut() {
            chain.deposit = Some(deposit);
        }

        let Some(pair) = pair else {
            tracker
                .transition(LifecycleState::Done, "exit: no new position minted")
                .await;
            state.summary.message = format!("Position {target} closed; no new position minted");
            info!(%target, "exit complete");
            return Ok(RebalanceResult::executed(
                forecast,
                volatility,
                state.summary.clone(),
            ));
        };

        let (token0, token1) = pair.sorted();
        let (amount0, amount1) = if pair.is_flipped() {
            (deposit.token_b, deposit.token_a)
        } else {
            (deposit.token_a, deposit.token_b)
        };

        let (current_tick, decimals0, decimals1) = tokio::try_join!(
            client.current_tick(settings.pool),
            client.decimals(token0),
            client.decimals(token1),
        )
        .map_err(|e| RebalanceError::chain("pool state read", e))?;

        if let Some(chain) = state.chain.as_mut() {
            chain.token0 = Some(token0);
            chain.token1 = Some(token1);
            chain.current_tick = Some(current_tick);
            chain.current_price = Some(tick_to_human_price(current_tick, decimals0, decimals1));
            chain.mint_amounts = Some((
                Amount::new(amount0, decimals0),
                Amount::new(amount1, decimals1),
            ));
        }

        let range = compute_range(
            current_tick,
            vol,
            self.engine.confidence_multiplier,
            decimals0,
            decimals1,
            self.engine.fee_tier,
        )?;
        state.summary.tick_range = Some(range);
        info!(
            current_tick,
            tick_lower = range.lower(),
            tick_upper = range.upper(),
            percent_of_base = deposit.percent_of_base,
            "new range computed"
        );

        let params = MintParams {
            token0,
            token1,
            fee_tier: self.engine.fee_tier,
            range,
            amount0_desired: amount0,
            amount1_desired: amount1,
            amount0_min: U256::ZERO,
            amount1_min: U256::ZERO,
            recipient: owner,
            deadline: manager.deadline(),
        };

        let tx_hash = manager.mint_position(&params).await?;
        if self.engine.await_mint_confirmation {
            manager.confirm(tx_hash).await?;
        }
        state.summary.new_position_tx = Some(tx_hash);

        tracker
            .transition(LifecycleState::Done, format!("minted in {tx_hash}"))
            .await;
        state.summary.message = "Rebalance completed successfully".to_string();
        info!(closed = %target, tx_hash = %tx_hash, "rebalance completed successfully");

        Ok(RebalanceResult::executed(
            forecast,
            volatility,
            state.summary.clone(),
        ))
    }
}

fn failure_result(err: &RebalanceError, state: &RunState) -> RebalanceResult {
    let mut result = RebalanceResult::failed(err.to_string(), err.detail());
    if let (Some(forecast), Some(volatility)) = (&state.forecast, &state.volatility) {
        result = result.with_decision(forecast, volatility.clone(), state.rebalance_needed);
    }
    if state.mutation_started {
        let mut summary = state.summary.clone();
        summary.message = format!("Rebalance failed: {err}");
        if let RebalanceError::Unconfirmed { tx_hash, .. } = err {
            summary.pending_tx = Some(*tx_hash);
        }
        result = result.with_rebalance(summary);
    }
    result
}
