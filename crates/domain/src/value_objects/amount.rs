use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw token amount with the token's decimal count attached.
///
/// Arithmetic stays in integers; `Decimal` is only used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Amount {
    pub raw: U256,
    pub decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Human units, or `None` when the value does not fit a `Decimal`.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let mut d = Decimal::from_str(&self.raw.to_string()).ok()?;
        d.set_scale(u32::from(self.decimals)).ok()?;
        Some(d.normalize())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(d) => write!(f, "{d}"),
            None => write!(f, "{} (raw, {} decimals)", self.raw, self.decimals),
        }
    }
}
