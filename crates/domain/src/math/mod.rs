pub mod price_tick;
pub mod tick_range;

pub use price_tick::{MAX_TICK, MIN_TICK, tick_to_human_price};
pub use tick_range::{RangeError, compute_range, round_to_spacing, tick_spacing_for_fee};
