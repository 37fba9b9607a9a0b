//! Volatility-driven tick range derivation.
//!
//! The forecast percentage is scaled by a z-score into an expected price
//! move `m`, the move is converted into a tick delta through the
//! `1.0001^tick` price relation, and the resulting symmetric interval is
//! snapped to the pool's tick spacing.

use super::price_tick::{MAX_TICK, MIN_TICK, human_price_to_tick_f64, tick_to_human_price};
use crate::value_objects::TickRange;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("unsupported fee tier {0}")]
    UnsupportedFeeTier(u32),
    #[error("{field} must be a non-negative number, got {value}")]
    InvalidInput { field: &'static str, value: String },
    #[error("current tick {0} outside [{MIN_TICK}, {MAX_TICK}]")]
    TickOutOfBounds(i32),
}

/// Tick spacing the pool enforces for a fee tier (hundredths of a bip).
pub fn tick_spacing_for_fee(fee_tier: u32) -> Result<i32, RangeError> {
    match fee_tier {
        100 => Ok(1),
        500 => Ok(10),
        3000 => Ok(60),
        10_000 => Ok(200),
        other => Err(RangeError::UnsupportedFeeTier(other)),
    }
}

/// Rounds to the nearest multiple of `spacing`; halves round up.
pub fn round_to_spacing(tick: i32, spacing: i32) -> i32 {
    let remainder = tick.rem_euclid(spacing);
    let floor = tick - remainder;
    if remainder * 2 >= spacing {
        floor + spacing
    } else {
        floor
    }
}

/// Computes the tick bounds for a new position centred on `current_tick`.
///
/// The returned range is never degenerate: when snapping collapses both
/// bounds onto one tick the range is widened by one spacing on each side.
pub fn compute_range(
    current_tick: i32,
    predicted_volatility_pct: Decimal,
    confidence_multiplier: Decimal,
    token0_decimals: u8,
    token1_decimals: u8,
    fee_tier: u32,
) -> Result<TickRange, RangeError> {
    let spacing = tick_spacing_for_fee(fee_tier)?;

    if !(MIN_TICK..=MAX_TICK).contains(&current_tick) {
        return Err(RangeError::TickOutOfBounds(current_tick));
    }
    if predicted_volatility_pct.is_sign_negative() && !predicted_volatility_pct.is_zero() {
        return Err(RangeError::InvalidInput {
            field: "predicted volatility",
            value: predicted_volatility_pct.to_string(),
        });
    }
    if confidence_multiplier.is_sign_negative() && !confidence_multiplier.is_zero() {
        return Err(RangeError::InvalidInput {
            field: "confidence multiplier",
            value: confidence_multiplier.to_string(),
        });
    }

    let expected_move = (predicted_volatility_pct / Decimal::ONE_HUNDRED * confidence_multiplier)
        .to_f64()
        .unwrap_or(0.0);

    let delta = tick_delta(current_tick, expected_move, token0_decimals, token1_decimals);

    let min_usable = (MIN_TICK / spacing) * spacing;
    let max_usable = (MAX_TICK / spacing) * spacing;

    let lower_raw = (i64::from(current_tick) - delta).max(i64::from(MIN_TICK)) as i32;
    let upper_raw = (i64::from(current_tick) + delta).min(i64::from(MAX_TICK)) as i32;

    let mut lower = round_to_spacing(lower_raw, spacing).clamp(min_usable, max_usable);
    let mut upper = round_to_spacing(upper_raw, spacing).clamp(min_usable, max_usable);

    if lower >= upper {
        lower -= spacing;
        upper += spacing;
    }
    if lower < min_usable {
        lower = min_usable;
        upper = upper.max(lower + spacing);
    }
    if upper > max_usable {
        upper = max_usable;
        lower = lower.min(upper - spacing);
    }

    TickRange::new(lower, upper).ok_or(RangeError::InvalidInput {
        field: "tick range",
        value: format!("[{lower}, {upper}]"),
    })
}

/// Number of ticks covering a fractional price move of `expected_move`.
fn tick_delta(current_tick: i32, expected_move: f64, token0_decimals: u8, token1_decimals: u8) -> i64 {
    if !expected_move.is_finite() || expected_move <= 0.0 {
        return 0;
    }
    let price = tick_to_human_price(current_tick, token0_decimals, token1_decimals);
    let moved = price * (1.0 + expected_move);
    let current = human_price_to_tick_f64(price, token0_decimals, token1_decimals);
    let target = human_price_to_tick_f64(moved, token0_decimals, token1_decimals);
    let delta = (target - current).ceil();
    if delta.is_finite() {
        delta.clamp(0.0, f64::from(MAX_TICK - MIN_TICK)) as i64
    } else {
        i64::from(MAX_TICK - MIN_TICK)
    }
}
