//! Builds the chain client once a run has decided to act.

use crate::config::{ChainSettings, EngineConfig};
use crate::error::RebalanceError;
use std::sync::Arc;
use vol_lp_protocols::uniswap::{ClientOptions, UniswapV3Client};
use vol_lp_protocols::{PositionManagerClient, ProtocolError};

/// Opens a signing client for validated settings.
///
/// Called lazily, after the threshold check, so no-op runs never touch the
/// chain.
pub trait ChainConnector: Send + Sync {
    fn connect(
        &self,
        settings: &ChainSettings,
        engine: &EngineConfig,
    ) -> Result<Arc<dyn PositionManagerClient>, RebalanceError>;
}

/// Connects to Uniswap V3 over HTTP with a local signer.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniswapConnector;

impl ChainConnector for UniswapConnector {
    fn connect(
        &self,
        settings: &ChainSettings,
        engine: &EngineConfig,
    ) -> Result<Arc<dyn PositionManagerClient>, RebalanceError> {
        let options = ClientOptions {
            confirmation_timeout: engine.confirmation_timeout,
            poll_interval: engine.poll_interval,
        };
        let client = UniswapV3Client::connect(
            &settings.provider_url,
            &settings.private_key,
            settings.nft_manager,
            options,
        )
        .map_err(|e| match e {
            ProtocolError::Signer(msg) => RebalanceError::config(format!("privateKey: {msg}")),
            other => RebalanceError::config(format!("providerUrl: {other}")),
        })?;
        Ok(Arc::new(client))
    }
}
