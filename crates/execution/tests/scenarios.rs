//! End-to-end rebalance runs against the in-memory chain.

mod common;

use alloy_primitives::U256;
use common::{
    Call, FixedForecaster, MockClient, MockConnector, position, sepolia_secrets,
    sepolia_secrets_with,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use vol_lp_domain::{NftId, RebalanceAction, RebalanceRequest, ThresholdLevel};
use vol_lp_execution::config::{EngineConfig, SecretConfig};
use vol_lp_execution::lifecycle::{LifecycleState, Stage};
use vol_lp_execution::strategy::Rebalancer;
use vol_lp_protocols::uniswap::addresses::SEPOLIA;

fn request(action: RebalanceAction) -> RebalanceRequest {
    RebalanceRequest::new("UNIWETH", action, ThresholdLevel::Moderate)
}

fn rebalancer(
    predicted: rust_decimal::Decimal,
    client: &Arc<MockClient>,
) -> Rebalancer<FixedForecaster, MockConnector> {
    Rebalancer::new(
        FixedForecaster::new(predicted),
        MockConnector(client.clone()),
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn test_low_volatility_is_a_no_op() {
    let client = Arc::new(MockClient::new(vec![position(42, 1_000)]));
    let engine = rebalancer(dec!(1.0), &client);

    let result = engine
        .run(&request(RebalanceAction::AutoOptimize), &sepolia_secrets())
        .await;

    assert!(result.success);
    assert!(!result.rebalance_needed);
    assert!(result.reason.as_deref().unwrap().contains("below threshold"));
    assert_eq!(result.volatility.as_ref().unwrap().threshold, dec!(5));
    assert!(result.rebalance.is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_high_volatility_rebalances_named_position() {
    let client = Arc::new(MockClient::new(vec![position(42, 1_000)]));
    let engine = rebalancer(dec!(18.0), &client);
    let req = request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(42));

    let outcome = engine.run_detailed(&req, &sepolia_secrets()).await;
    let result = &outcome.result;

    assert!(result.success, "{:?}", result.error);
    assert!(result.rebalance_needed);
    let summary = result.rebalance.as_ref().unwrap();
    assert_eq!(summary.closed_positions, vec![NftId::from(42)]);
    assert!(summary.new_position_tx.is_some());
    let range = summary.tick_range.unwrap();
    assert!(range.lower() < range.upper());
    assert!(range.contains(1_020));
    assert_eq!(range.lower() % 60, 0);
    assert_eq!(range.upper() % 60, 0);
    assert_eq!(summary.message, "Rebalance completed successfully");

    let calls = client.calls();
    assert_eq!(calls[0], Call::DecreaseLiquidity(NftId::from(42)));
    assert_eq!(calls[1], Call::Collect(NftId::from(42)));
    let mint = calls
        .iter()
        .find_map(|c| match c {
            Call::SubmitMint(m) => Some(m.clone()),
            _ => None,
        })
        .unwrap();
    assert!(mint.token0 < mint.token1);
    assert_eq!((mint.lower, mint.upper), (range.lower(), range.upper()));

    // 75% of the base deposit above 15% volatility, whichever side UNI sorts to.
    let uni_amount = if mint.token0 == SEPOLIA.uni {
        mint.amount0
    } else {
        mint.amount1
    };
    assert_eq!(uni_amount, U256::from(75_000_000_000_000u64));
    assert!(matches!(calls.last(), Some(Call::Confirm(_))));

    assert_eq!(outcome.closed.len(), 1);
    assert_eq!(outcome.closed[0].liquidity, 1_000);
    let last = outcome.events.last().unwrap();
    assert_eq!(last.stage, Stage::Lifecycle(LifecycleState::Done));
    assert_eq!(outcome.state, LifecycleState::Done);
}

#[tokio::test]
async fn test_mint_revert_still_reports_closed_position() {
    let client = Arc::new(MockClient::new(vec![position(7, 500)]).reverting_mint());
    let engine = rebalancer(dec!(18.0), &client);
    let req = request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(7));

    let outcome = engine.run_detailed(&req, &sepolia_secrets()).await;
    let result = &outcome.result;

    assert!(!result.success);
    assert!(result.rebalance_needed);
    assert_eq!(result.closed_positions(), &[NftId::from(7)]);
    let summary = result.rebalance.as_ref().unwrap();
    assert!(summary.new_position_tx.is_none());
    assert!(summary.message.starts_with("Rebalance failed"));
    assert!(result.error.as_deref().unwrap().contains("mint confirmation"));
    assert!(result.stack.as_deref().unwrap().starts_with("ChainError"));
    assert!(summary.pending_tx.is_none());
    assert!(result.volatility.is_some());
    assert_eq!(outcome.state, LifecycleState::Failed);
}

#[tokio::test]
async fn test_latest_position_is_closed_when_none_named() {
    let client = Arc::new(MockClient::new(vec![position(3, 10), position(9, 20)]));
    let engine = rebalancer(dec!(12.0), &client);

    let result = engine
        .run(&request(RebalanceAction::ReduceExposure), &sepolia_secrets())
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.closed_positions(), &[NftId::from(9)]);
}

#[tokio::test]
async fn test_exit_closes_without_minting() {
    let client = Arc::new(MockClient::new(vec![position(11, 1_000)]));
    // Exit acts even below the threshold.
    let engine = rebalancer(dec!(1.0), &client);
    let req = request(RebalanceAction::ExitPosition).with_nft_id(NftId::from(11));

    let result = engine.run(&req, &sepolia_secrets()).await;

    assert!(result.success);
    assert!(result.rebalance_needed);
    let summary = result.rebalance.as_ref().unwrap();
    assert_eq!(summary.closed_positions, vec![NftId::from(11)]);
    assert!(summary.new_position_tx.is_none());
    assert!(summary.tick_range.is_none());
    assert!(
        !client
            .calls()
            .iter()
            .any(|c| matches!(c, Call::SubmitMint(_) | Call::Approve(..)))
    );
}

#[tokio::test]
async fn test_no_position_fails_before_any_write() {
    let client = Arc::new(MockClient::new(Vec::new()));
    let engine = rebalancer(dec!(18.0), &client);

    let result = engine
        .run(&request(RebalanceAction::AutoOptimize), &sepolia_secrets())
        .await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("no position"));
    assert!(result.rebalance.is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_missing_secrets_fail_before_forecast() {
    let client = Arc::new(MockClient::new(vec![position(42, 1_000)]));
    let engine = Rebalancer::new(
        FixedForecaster::unavailable(),
        MockConnector(client.clone()),
        EngineConfig::default(),
    );

    let result = engine
        .run(&request(RebalanceAction::AutoOptimize), &SecretConfig::default())
        .await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("privateKey"));
    assert!(result.volatility.is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_forecast_outage_touches_nothing() {
    let client = Arc::new(MockClient::new(vec![position(42, 1_000)]));
    let engine = Rebalancer::new(
        FixedForecaster::unavailable(),
        MockConnector(client.clone()),
        EngineConfig::default(),
    );

    let result = engine
        .run(&request(RebalanceAction::AutoOptimize), &sepolia_secrets())
        .await;

    assert!(!result.success);
    assert!(result.stack.as_deref().unwrap().starts_with("ForecastUnavailable"));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_chain_id_mismatch_is_a_config_error() {
    let client = Arc::new(MockClient::new(vec![position(42, 1_000)]).on_chain(1));
    let engine = rebalancer(dec!(18.0), &client);

    let result = engine
        .run(&request(RebalanceAction::AutoOptimize), &sepolia_secrets())
        .await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("provider is on chain 1"));
    assert!(result.rebalance.is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_failed_approval_reports_source() {
    let client = Arc::new(MockClient::new(vec![position(5, 100)]).failing_approve());
    let engine = rebalancer(dec!(18.0), &client);
    let req = request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(5));

    let result = engine.run(&req, &sepolia_secrets()).await;

    assert!(!result.success);
    assert_eq!(result.closed_positions(), &[NftId::from(5)]);
    let stack = result.stack.as_deref().unwrap();
    assert!(stack.starts_with("ApprovalError"));
    assert!(stack.contains("caused by: transaction"));
    assert!(
        !client
            .calls()
            .iter()
            .any(|c| matches!(c, Call::SubmitMint(_)))
    );
}

#[tokio::test]
async fn test_events_follow_run_order() {
    let client = Arc::new(MockClient::new(vec![position(42, 1_000)]));
    let engine = rebalancer(dec!(18.0), &client);
    let mut rx = engine.subscribe().await;
    let req = request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(42));

    engine.run(&req, &sepolia_secrets()).await;

    let mut stages = Vec::new();
    while let Ok(event) = rx.try_recv() {
        stages.push(event.stage);
    }
    assert_eq!(
        stages,
        vec![
            Stage::Config,
            Stage::Forecast,
            Stage::Decision,
            Stage::Lifecycle(LifecycleState::Closing),
            Stage::Lifecycle(LifecycleState::Collecting),
            Stage::Lifecycle(LifecycleState::Approving),
            Stage::Lifecycle(LifecycleState::Approving),
            Stage::Lifecycle(LifecycleState::Minting),
            Stage::Lifecycle(LifecycleState::Done),
        ]
    );
}

#[tokio::test]
async fn test_identical_tokens_fail_before_any_write() {
    let client = Arc::new(MockClient::new(vec![position(7, 500)]));
    let engine = rebalancer(dec!(18.0), &client);
    let req = request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(7));
    // UNIWETH routes to UNI/WETH, so overriding tokenA with WETH collides.
    let secrets = sepolia_secrets_with(&[("tokenA", SEPOLIA.weth.to_string())]);

    let result = engine.run(&req, &secrets).await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("tokenA and tokenB must differ"));
    assert!(result.stack.as_deref().unwrap().starts_with("ConfigError"));
    assert!(result.rebalance.is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_unsupported_fee_tier_fails_before_any_write() {
    let client = Arc::new(MockClient::new(vec![position(7, 500)]));
    let engine = Rebalancer::new(
        FixedForecaster::new(dec!(18.0)),
        MockConnector(client.clone()),
        EngineConfig {
            fee_tier: 2500,
            ..EngineConfig::default()
        },
    );
    let req = request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(7));

    let result = engine.run(&req, &sepolia_secrets()).await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("unsupported fee tier 2500"));
    assert!(result.stack.as_deref().unwrap().starts_with("ConfigError"));
    assert!(result.rebalance.is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_exit_does_not_need_mint_settings() {
    let client = Arc::new(MockClient::new(vec![position(11, 1_000)]));
    let engine = Rebalancer::new(
        FixedForecaster::new(dec!(18.0)),
        MockConnector(client.clone()),
        EngineConfig {
            fee_tier: 2500,
            ..EngineConfig::default()
        },
    );
    let req = request(RebalanceAction::ExitPosition).with_nft_id(NftId::from(11));

    let result = engine.run(&req, &sepolia_secrets()).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.closed_positions(), &[NftId::from(11)]);
}

#[tokio::test]
async fn test_consecutive_runs_do_not_share_progress() {
    let client = Arc::new(MockClient::new(vec![position(42, 1_000), position(43, 800)]));
    let engine = rebalancer(dec!(18.0), &client);
    let secrets = sepolia_secrets();

    let first = engine
        .run_detailed(
            &request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(42)),
            &secrets,
        )
        .await;
    let second = engine
        .run_detailed(
            &request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(43)),
            &secrets,
        )
        .await;

    assert!(first.result.success, "{:?}", first.result.error);
    assert!(second.result.success, "{:?}", second.result.error);
    assert_eq!(second.result.closed_positions(), &[NftId::from(43)]);
    assert_eq!(second.state, LifecycleState::Done);

    let stages: Vec<_> = second.events.iter().map(|e| e.stage).collect();
    assert_eq!(stages.first(), Some(&Stage::Config));
    assert_eq!(stages.iter().filter(|s| **s == Stage::Config).count(), 1);
    assert!(stages.contains(&Stage::Lifecycle(LifecycleState::Closing)));
    assert!(stages.contains(&Stage::Lifecycle(LifecycleState::Minting)));
    assert_eq!(stages.last(), Some(&Stage::Lifecycle(LifecycleState::Done)));
    assert!(
        second
            .events
            .iter()
            .all(|e| first.events.iter().all(|f| f.id != e.id))
    );
}

#[tokio::test]
async fn test_unconfirmed_mint_keeps_its_hash() {
    let client = Arc::new(MockClient::new(vec![position(42, 1_000)]).stalled_confirmation());
    let engine = rebalancer(dec!(18.0), &client);
    let req = request(RebalanceAction::AutoOptimize).with_nft_id(NftId::from(42));

    let result = engine.run(&req, &sepolia_secrets()).await;

    assert!(!result.success);
    let submitted = client
        .calls()
        .iter()
        .find_map(|c| match c {
            Call::Confirm(hash) => Some(*hash),
            _ => None,
        })
        .unwrap();
    let summary = result.rebalance.as_ref().unwrap();
    assert_eq!(summary.closed_positions, vec![NftId::from(42)]);
    assert!(summary.new_position_tx.is_none());
    assert_eq!(summary.pending_tx, Some(submitted));
    assert!(result.error.as_deref().unwrap().contains("not confirmed"));
    assert!(result.stack.as_deref().unwrap().starts_with("ChainError"));
}
