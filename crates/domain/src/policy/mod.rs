//! Decision rules: whether to act on a forecast and how much to deposit.

pub mod sizing;
pub mod threshold;

pub use sizing::{BaseAmounts, DepositAmounts, deposit_amounts};
pub use threshold::{ThresholdTable, should_rebalance};
