//! Secret and engine configuration.
//!
//! Secrets arrive as a flat string map (decrypted upstream) and are turned
//! into [`ChainSettings`] by [`SecretConfig::validate`]. Engine tunables live
//! in [`EngineConfig`] and have defaults matching production use.

use crate::error::RebalanceError;
use alloy_primitives::Address;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use vol_lp_data::ForecastClientConfig;
use vol_lp_domain::policy::{BaseAmounts, ThresholdTable};
use vol_lp_protocols::uniswap::{Deployment, TokenPair, deployment, route_pair};
use zeroize::Zeroizing;

/// Key aliases accepted for each secret, first match wins.
const PRIVATE_KEY: &[&str] = &["privateKey", "PRIVATE_KEY"];
const PROVIDER_URL: &[&str] = &["providerUrl", "PROVIDER_URL"];
const CHAIN_ID: &[&str] = &["chainId", "CHAIN_ID"];
const NFT_MANAGER: &[&str] = &["nftManager", "nftManagerAddress", "NFT_MANAGER_ADDRESS"];
const TOKEN_A: &[&str] = &["tokenA", "tokenAAddress", "TOKEN_A_ADDRESS"];
const TOKEN_B: &[&str] = &["tokenB", "tokenBAddress", "TOKEN_B_ADDRESS"];
const POOL: &[&str] = &["pool", "poolAddress", "POOL_ADDRESS"];

const ENV_KEYS: [&str; 7] = [
    "PRIVATE_KEY",
    "PROVIDER_URL",
    "CHAIN_ID",
    "NFT_MANAGER_ADDRESS",
    "TOKEN_A_ADDRESS",
    "TOKEN_B_ADDRESS",
    "POOL_ADDRESS",
];

/// Raw, unvalidated secrets.
#[derive(Clone, Default)]
pub struct SecretConfig {
    pub private_key: Option<Zeroizing<String>>,
    pub provider_url: Option<String>,
    pub chain_id: Option<String>,
    pub nft_manager: Option<String>,
    pub token_a: Option<String>,
    pub token_b: Option<String>,
    pub pool: Option<String>,
}

impl fmt::Debug for SecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretConfig")
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("provider_url", &self.provider_url)
            .field("chain_id", &self.chain_id)
            .field("nft_manager", &self.nft_manager)
            .field("token_a", &self.token_a)
            .field("token_b", &self.token_b)
            .field("pool", &self.pool)
            .finish()
    }
}

fn lookup(map: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

impl SecretConfig {
    /// Reads every known key and alias from a flat string map.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            private_key: lookup(map, PRIVATE_KEY).map(Zeroizing::new),
            provider_url: lookup(map, PROVIDER_URL),
            chain_id: lookup(map, CHAIN_ID),
            nft_manager: lookup(map, NFT_MANAGER),
            token_a: lookup(map, TOKEN_A),
            token_b: lookup(map, TOKEN_B),
            pool: lookup(map, POOL),
        }
    }

    /// Reads the process environment (call `dotenv` first to include `.env`).
    pub fn from_env() -> Self {
        let map: HashMap<String, String> = ENV_KEYS
            .iter()
            .filter_map(|k| std::env::var(k).ok().map(|v| (k.to_string(), v)))
            .collect();
        Self::from_map(&map)
    }

    /// Reads a JSON object of secrets. Numbers and booleans are accepted and
    /// stringified, so `"chainId": 11155111` works as well as the string form.
    pub fn from_json_str(raw: &str) -> Result<Self, RebalanceError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| RebalanceError::config(format!("secrets are not valid JSON: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| RebalanceError::config("secrets must be a JSON object"))?;

        let map: HashMap<String, String> = object
            .iter()
            .filter_map(|(k, v)| {
                let s = match v {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((k.clone(), s))
            })
            .collect();
        Ok(Self::from_map(&map))
    }

    /// Loads a JSON object of string (or numeric) values from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, RebalanceError> {
        let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| {
            RebalanceError::config(format!("cannot read secrets file {}: {e}", path.display()))
        })?);
        Self::from_json_str(&raw)
    }

    /// Checks required fields and resolves every address the run needs.
    ///
    /// Precedence: secret override, then the request's pool (pool only),
    /// then the built-in deployment for the chain.
    pub fn validate(&self, request_pool: Option<Address>) -> Result<ChainSettings, RebalanceError> {
        let private_key = self
            .private_key
            .clone()
            .ok_or_else(|| RebalanceError::config("missing privateKey"))?;
        let provider_url = self
            .provider_url
            .clone()
            .ok_or_else(|| RebalanceError::config("missing providerUrl"))?;
        let chain_id: u64 = self
            .chain_id
            .as_deref()
            .ok_or_else(|| RebalanceError::config("missing chainId"))?
            .parse()
            .map_err(|e| RebalanceError::config(format!("chainId is not an integer: {e}")))?;

        let known = deployment(chain_id);

        let nft_manager = match parse_address("nftManager", self.nft_manager.as_deref())? {
            Some(addr) => addr,
            None => known.map(|d| d.nft_manager).ok_or_else(|| {
                RebalanceError::config(format!(
                    "no nftManager configured and chain {chain_id} has no known deployment"
                ))
            })?,
        };

        let pool = match parse_address("pool", self.pool.as_deref())? {
            Some(addr) => addr,
            None => request_pool
                .or_else(|| known.and_then(|d| d.default_pool))
                .ok_or_else(|| {
                    RebalanceError::config(format!(
                        "no pool configured and chain {chain_id} has no default pool"
                    ))
                })?,
        };

        let token_a = parse_address("tokenA", self.token_a.as_deref())?;
        let token_b = parse_address("tokenB", self.token_b.as_deref())?;
        if known.is_none() && (token_a.is_none() || token_b.is_none()) {
            return Err(RebalanceError::config(format!(
                "chain {chain_id} has no known deployment; tokenA and tokenB must be configured"
            )));
        }

        Ok(ChainSettings {
            private_key,
            provider_url,
            chain_id,
            nft_manager,
            pool,
            token_a,
            token_b,
            deployment: known,
        })
    }
}

fn parse_address(key: &str, raw: Option<&str>) -> Result<Option<Address>, RebalanceError> {
    raw.map(|s| {
        s.parse::<Address>()
            .map_err(|e| RebalanceError::config(format!("{key} is not a valid address: {e}")))
    })
    .transpose()
}

/// Validated chain connection settings for one run.
#[derive(Clone)]
pub struct ChainSettings {
    pub private_key: Zeroizing<String>,
    pub provider_url: String,
    pub chain_id: u64,
    pub nft_manager: Address,
    pub pool: Address,
    token_a: Option<Address>,
    token_b: Option<Address>,
    deployment: Option<&'static Deployment>,
}

impl fmt::Debug for ChainSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainSettings")
            .field("private_key", &"<redacted>")
            .field("provider_url", &self.provider_url)
            .field("chain_id", &self.chain_id)
            .field("nft_manager", &self.nft_manager)
            .field("pool", &self.pool)
            .field("token_a", &self.token_a)
            .field("token_b", &self.token_b)
            .finish()
    }
}

impl ChainSettings {
    /// Token pair for `trading_pair`: explicit overrides win, otherwise the
    /// pair is routed through the chain's known deployment.
    pub fn token_pair(&self, trading_pair: &str) -> Result<TokenPair, RebalanceError> {
        let routed = self.deployment.map(|d| route_pair(trading_pair, d));
        let token_a = self
            .token_a
            .or(routed.map(|p| p.token_a))
            .ok_or_else(|| RebalanceError::config("tokenA could not be resolved"))?;
        let token_b = self
            .token_b
            .or(routed.map(|p| p.token_b))
            .ok_or_else(|| RebalanceError::config("tokenB could not be resolved"))?;
        if token_a == token_b {
            return Err(RebalanceError::config("tokenA and tokenB must differ"));
        }
        Ok(TokenPair { token_a, token_b })
    }
}

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Numeric value of each threshold level, percent.
    pub thresholds: ThresholdTable,
    /// Forecast horizon sent to the service.
    pub horizon_days: u32,
    /// z-score applied to the forecast when sizing the range.
    pub confidence_multiplier: Decimal,
    /// Fee tier of the pool positions are minted in.
    pub fee_tier: u32,
    /// Deadline window for decrease and mint calls.
    pub deadline_window: Duration,
    /// How long to wait for each receipt.
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls.
    pub poll_interval: Duration,
    /// Reference deposit before volatility scaling.
    pub base_amounts: BaseAmounts,
    /// Forecast service connection.
    pub forecast: ForecastClientConfig,
    /// Wait for the mint receipt before reporting success.
    pub await_mint_confirmation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdTable::default(),
            horizon_days: 15,
            confidence_multiplier: Decimal::new(196, 2),
            fee_tier: 3000,
            deadline_window: Duration::from_secs(600),
            confirmation_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
            base_amounts: BaseAmounts::default(),
            forecast: ForecastClientConfig::default(),
            await_mint_confirmation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vol_lp_protocols::uniswap::addresses::SEPOLIA;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn secrets(chain_id: &str) -> HashMap<String, String> {
        HashMap::from([
            ("privateKey".to_string(), KEY.to_string()),
            ("providerUrl".to_string(), "http://localhost:8545".to_string()),
            ("chainId".to_string(), chain_id.to_string()),
        ])
    }

    #[test]
    fn test_missing_required_fields() {
        let err = SecretConfig::default().validate(None).unwrap_err();
        assert!(matches!(err, RebalanceError::Config(msg) if msg.contains("privateKey")));

        let mut map = secrets("11155111");
        map.remove("providerUrl");
        let err = SecretConfig::from_map(&map).validate(None).unwrap_err();
        assert!(matches!(err, RebalanceError::Config(msg) if msg.contains("providerUrl")));
    }

    #[test]
    fn test_bad_chain_id() {
        let err = SecretConfig::from_map(&secrets("sepolia"))
            .validate(None)
            .unwrap_err();
        assert!(matches!(err, RebalanceError::Config(msg) if msg.contains("chainId")));
    }

    #[test]
    fn test_known_chain_fills_addresses() {
        let settings = SecretConfig::from_map(&secrets("11155111"))
            .validate(None)
            .unwrap();
        assert_eq!(settings.chain_id, 11_155_111);
        assert_eq!(settings.nft_manager, SEPOLIA.nft_manager);
        assert_eq!(Some(settings.pool), SEPOLIA.default_pool);

        let pair = settings.token_pair("UNIWETH").unwrap();
        assert_eq!(pair.token_a, SEPOLIA.uni);
        assert_eq!(pair.token_b, SEPOLIA.weth);
    }

    #[test]
    fn test_override_beats_request_pool() {
        let request_pool = Address::repeat_byte(0x11);
        let settings = SecretConfig::from_map(&secrets("11155111"))
            .validate(Some(request_pool))
            .unwrap();
        assert_eq!(settings.pool, request_pool);

        let mut map = secrets("11155111");
        map.insert(
            "poolAddress".into(),
            "0x2222222222222222222222222222222222222222".into(),
        );
        let settings = SecretConfig::from_map(&map)
            .validate(Some(request_pool))
            .unwrap();
        assert_eq!(settings.pool, Address::repeat_byte(0x22));
    }

    #[test]
    fn test_unknown_chain_requires_overrides() {
        let err = SecretConfig::from_map(&secrets("137"))
            .validate(Some(Address::repeat_byte(1)))
            .unwrap_err();
        assert!(matches!(err, RebalanceError::Config(_)));
    }

    #[test]
    fn test_json_secrets_accept_numeric_chain_id() {
        let raw = format!(
            r#"{{"privateKey": "{KEY}", "providerUrl": "http://x", "chainId": 11155111, "tokenAAddress": "0x3333333333333333333333333333333333333333"}}"#
        );
        let config = SecretConfig::from_json_str(&raw).unwrap();
        assert_eq!(config.chain_id.as_deref(), Some("11155111"));
        let settings = config.validate(None).unwrap();
        let pair = settings.token_pair("LINKUSDT").unwrap();
        assert_eq!(pair.token_a, Address::repeat_byte(0x33));
        assert_eq!(pair.token_b, SEPOLIA.usdc);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = SecretConfig::from_map(&secrets("1"));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(&KEY[2..]));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.horizon_days, 15);
        assert_eq!(engine.fee_tier, 3000);
        assert_eq!(engine.confidence_multiplier, Decimal::new(196, 2));
        assert_eq!(engine.deadline_window, Duration::from_secs(600));
        assert!(engine.await_mint_confirmation);
    }
}
