pub mod amount;
pub mod tick_range;

pub use amount::Amount;
pub use tick_range::TickRange;
