//! Known deployments and the trading-pair to token-pair routing.

use alloy_primitives::{Address, address};

pub const MAINNET_CHAIN_ID: u64 = 1;
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Contract and token addresses for one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub chain_id: u64,
    pub nft_manager: Address,
    pub uni: Address,
    pub weth: Address,
    pub usdc: Address,
    /// UNI/USDC pool used when none is configured.
    pub default_pool: Option<Address>,
}

pub const MAINNET: Deployment = Deployment {
    chain_id: MAINNET_CHAIN_ID,
    nft_manager: address!("0xC36442b4a4522E871399CD717aBDD847Ab11FE88"),
    uni: address!("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984"),
    weth: address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
    usdc: address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
    default_pool: None,
};

pub const SEPOLIA: Deployment = Deployment {
    chain_id: SEPOLIA_CHAIN_ID,
    nft_manager: address!("0x1238536071E1c677A632429e3655c799b22cDA52"),
    uni: address!("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984"),
    weth: address!("0xfFf9976782d46CC05630D1f6eBAb18b2324d6B14"),
    usdc: address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
    default_pool: Some(address!("0x287B0e934ed0439E2a7b1d5F0FC25eA2c24b64f7")),
};

/// Known deployment for `chain_id`.
pub fn deployment(chain_id: u64) -> Option<&'static Deployment> {
    match chain_id {
        MAINNET_CHAIN_ID => Some(&MAINNET),
        SEPOLIA_CHAIN_ID => Some(&SEPOLIA),
        _ => None,
    }
}

/// Token pair a position is opened in, in caller order (not sorted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPair {
    pub token_a: Address,
    pub token_b: Address,
}

impl TokenPair {
    /// `(token0, token1)` as the pool orders them.
    pub fn sorted(&self) -> (Address, Address) {
        if self.token_a < self.token_b {
            (self.token_a, self.token_b)
        } else {
            (self.token_b, self.token_a)
        }
    }

    /// True when sorting swaps A and B.
    pub fn is_flipped(&self) -> bool {
        self.token_b < self.token_a
    }
}

/// Maps a forecast pair to the on-chain tokens that are actually traded.
///
/// `UNIWETH` trades UNI against WETH; every other pair, USDT-quoted or
/// not, is hedged in the UNI/USDC pool.
pub fn route_pair(trading_pair: &str, deployment: &Deployment) -> TokenPair {
    let quote = if trading_pair.trim().eq_ignore_ascii_case("UNIWETH") {
        deployment.weth
    } else {
        deployment.usdc
    };
    TokenPair {
        token_a: deployment.uni,
        token_b: quote,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_chain() {
        assert_eq!(deployment(1).map(|d| d.nft_manager), Some(MAINNET.nft_manager));
        assert_eq!(deployment(11_155_111).map(|d| d.weth), Some(SEPOLIA.weth));
        assert!(deployment(137).is_none());
    }

    #[test]
    fn test_route_pair() {
        let linked = route_pair("linkusdt", &SEPOLIA);
        assert_eq!(linked.token_a, SEPOLIA.uni);
        assert_eq!(linked.token_b, SEPOLIA.usdc);

        let weth = route_pair("uniweth", &MAINNET);
        assert_eq!(weth.token_b, MAINNET.weth);

        assert_eq!(route_pair("BTCEUR", &SEPOLIA).token_b, SEPOLIA.usdc);
    }

    #[test]
    fn test_sorting_orders_by_address() {
        let pair = TokenPair {
            token_a: SEPOLIA.uni,
            token_b: SEPOLIA.usdc,
        };
        let (t0, t1) = pair.sorted();
        assert!(t0 < t1);
        // USDC 0x1c7D.. sorts before UNI 0x1f98..
        assert!(pair.is_flipped());
        assert_eq!(t0, SEPOLIA.usdc);
    }
}
