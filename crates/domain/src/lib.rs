//! Domain types and pure calculations for the volatility rebalancer.
//!
//! Nothing in this crate performs I/O. Every function here is deterministic
//! given its inputs, which is what lets the policy and the tick math be
//! exercised without a chain connection.

pub mod entities;
pub mod enums;
pub mod math;
pub mod policy;
pub mod result;
pub mod value_objects;

pub use entities::{ForecastResult, NftId, Position, RebalanceRequest};
pub use enums::{RebalanceAction, RiskLevel, ThresholdLevel};
pub use result::{RebalanceResult, RebalanceSummary, VolatilitySummary};
pub use value_objects::{amount::Amount, tick_range::TickRange};
