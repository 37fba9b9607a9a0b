/// Lowest tick a Uniswap V3 pool accepts.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick a Uniswap V3 pool accepts.
pub const MAX_TICK: i32 = 887_272;

const TICK_BASE: f64 = 1.0001;

/// Price of token0 in token1 in whole-token units at `tick`.
///
/// Raw pool prices are quoted in smallest units, so a pool pairing an
/// 18-decimal token0 with a 6-decimal token1 has raw prices 10^12 smaller
/// than the human price.
pub fn tick_to_human_price(tick: i32, token0_decimals: u8, token1_decimals: u8) -> f64 {
    TICK_BASE.powi(tick) * decimal_scale(token0_decimals, token1_decimals)
}

/// Inverse of [`tick_to_human_price`], unrounded.
pub fn human_price_to_tick_f64(price: f64, token0_decimals: u8, token1_decimals: u8) -> f64 {
    (price / decimal_scale(token0_decimals, token1_decimals)).ln() / TICK_BASE.ln()
}

fn decimal_scale(token0_decimals: u8, token1_decimals: u8) -> f64 {
    10f64.powi(i32::from(token0_decimals) - i32::from(token1_decimals))
}
