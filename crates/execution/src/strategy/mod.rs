//! Rebalance strategy: chain connection, position lifecycle and the
//! orchestrator tying them to the forecast.

pub mod connector;
pub mod position_manager;
pub mod rebalance;

pub use connector::{ChainConnector, UniswapConnector};
pub use position_manager::{ClosedPosition, PositionLifecycleManager};
pub use rebalance::{ChainSummary, Rebalancer, RunOutcome};
