use crate::enums::RebalanceAction;
use alloy_primitives::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Reference deposit, in raw token units, before any volatility scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAmounts {
    pub token_a: U256,
    pub token_b: U256,
}

impl Default for BaseAmounts {
    fn default() -> Self {
        Self {
            token_a: U256::from(100_000_000_000_000u64),
            token_b: U256::from(1_000_000_000_000_000u64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAmounts {
    pub token_a: U256,
    pub token_b: U256,
    /// Whole-percent multiplier applied to the base amounts.
    pub percent_of_base: u64,
}

impl DepositAmounts {
    pub fn is_zero(&self) -> bool {
        self.token_a.is_zero() && self.token_b.is_zero()
    }
}

const AUTO_HIGH_VOL: Decimal = Decimal::from_parts(15, 0, 0, false, 0);
const AUTO_LOW_VOL: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Scales the base deposit according to `action` and the forecast
/// volatility (in percent).
///
/// - reduce: cut by `min(vol / 20, 0.5)`
/// - increase: multiply by `max(1.2, 2 - vol / 10)`
/// - exit: nothing
/// - auto: 75% above 15 vol, 125% below 5 vol, unchanged otherwise
///
/// Fractions are floored to whole percent before the integer multiply.
pub fn deposit_amounts(
    action: RebalanceAction,
    volatility_pct: Decimal,
    base: &BaseAmounts,
) -> DepositAmounts {
    let volatility_pct = volatility_pct.max(Decimal::ZERO);
    let percent = match action {
        RebalanceAction::ReduceExposure => {
            let reduction = (volatility_pct / Decimal::from(20)).min(Decimal::new(5, 1));
            100 - whole_percent(reduction)
        }
        RebalanceAction::IncreaseExposure => {
            let increase = (Decimal::TWO - volatility_pct / Decimal::TEN).max(Decimal::new(12, 1));
            whole_percent(increase)
        }
        RebalanceAction::ExitPosition => 0,
        RebalanceAction::AutoOptimize => {
            if volatility_pct > AUTO_HIGH_VOL {
                75
            } else if volatility_pct < AUTO_LOW_VOL {
                125
            } else {
                100
            }
        }
    };

    DepositAmounts {
        token_a: scale(base.token_a, percent),
        token_b: scale(base.token_b, percent),
        percent_of_base: percent,
    }
}

fn whole_percent(fraction: Decimal) -> u64 {
    (fraction * Decimal::ONE_HUNDRED).floor().to_u64().unwrap_or(0)
}

fn scale(amount: U256, percent: u64) -> U256 {
    amount.saturating_mul(U256::from(percent)) / U256::from(100u64)
}
