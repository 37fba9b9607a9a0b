use alloy_primitives::{Address, U256};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Token id of a position NFT.
///
/// Serialized as a JSON number when it fits in a `u64`, otherwise as a
/// decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NftId(pub U256);

impl NftId {
    pub fn as_u256(&self) -> U256 {
        self.0
    }
}

impl From<u64> for NftId {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<U256> for NftId {
    fn from(v: U256) -> Self {
        Self(v)
    }
}

impl FromStr for NftId {
    type Err = alloy_primitives::ruint::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str_radix(s.trim(), 10).map(Self)
    }
}

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NftId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match u64::try_from(self.0) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for NftId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NftIdVisitor;

        impl Visitor<'_> for NftIdVisitor {
            type Value = NftId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an unsigned integer or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<NftId, E> {
                Ok(NftId::from(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NftId, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(NftIdVisitor)
    }
}

/// On-chain state of a liquidity position as returned by `positions(id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub nft_id: NftId,
    pub token0: Address,
    pub token1: Address,
    pub fee_tier: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

impl Position {
    pub fn has_liquidity(&self) -> bool {
        self.liquidity > 0
    }

    /// Human-readable multi-line summary used in reports.
    pub fn summary(&self) -> String {
        format!(
            "Position ID: {}\n  Liquidity: {}\n  Fee Tier: {}%\n  Tick Range: {} to {}\n  Tokens Owed: {} / {}\n",
            self.nft_id,
            self.liquidity,
            (rust_decimal::Decimal::from(self.fee_tier) / rust_decimal::Decimal::from(10_000))
                .normalize(),
            self.tick_lower,
            self.tick_upper,
            self.tokens_owed0,
            self.tokens_owed1,
        )
    }
}
