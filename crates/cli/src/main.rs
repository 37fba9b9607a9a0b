//! Command line entry point for the volatility rebalancer.
//!
//! Runs exactly one rebalance and writes its artifacts. The process exits
//! with status 0 whenever the artifacts were written; callers inspect the
//! files to learn the outcome.
use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vol_lp_data::HttpForecastClient;
use vol_lp_domain::entities::request::DEFAULT_TOKEN_PAIR;
use vol_lp_domain::{NftId, RebalanceAction, RebalanceRequest, RebalanceResult, ThresholdLevel};
use vol_lp_execution::artifacts::ArtifactWriter;
use vol_lp_execution::config::{EngineConfig, SecretConfig};
use vol_lp_execution::error::RebalanceError;
use vol_lp_execution::strategy::{Rebalancer, UniswapConnector};

#[derive(Parser)]
#[command(name = "vol-lp-rebalancer")]
#[command(about = "Rebalance a Uniswap V3 position from a volatility forecast", long_about = None)]
struct Cli {
    /// Trading pair to forecast (e.g., UNIWETH)
    #[arg(default_value = DEFAULT_TOKEN_PAIR)]
    token_pair: String,

    /// auto_optimize, reduce_exposure, increase_exposure or exit_position
    #[arg(default_value = "auto_optimize")]
    action: String,

    /// low, moderate, high or extreme
    #[arg(default_value = "moderate")]
    threshold_level: String,

    /// Pool to mint into, when no pool is configured in the secrets
    pool_address: Option<String>,

    /// Position to close; defaults to the most recent one
    #[arg(long)]
    nft_id: Option<String>,

    /// Directory for result artifacts
    #[arg(long, env = "IEXEC_OUT", default_value = "./output")]
    output_dir: PathBuf,

    /// JSON file with secrets; the environment is used when absent
    #[arg(long, env = "SECRETS_FILE")]
    secrets: Option<PathBuf>,

    /// Forecast service endpoint
    #[arg(long, env = "FORECAST_URL")]
    forecast_url: Option<String>,

    /// Forecast horizon in days
    #[arg(long, default_value_t = 15)]
    horizon_days: u32,

    /// Return once the mint is submitted instead of waiting for its receipt
    #[arg(long)]
    no_wait: bool,
}

impl Cli {
    /// Builds the request. Unknown action or level names fall back with a
    /// warning; a malformed pool or position id is a configuration error.
    fn request(&self) -> Result<RebalanceRequest, RebalanceError> {
        let action = self
            .action
            .parse::<RebalanceAction>()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to auto_optimize");
                RebalanceAction::AutoOptimize
            });
        let threshold_level = self
            .threshold_level
            .parse::<ThresholdLevel>()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to moderate");
                ThresholdLevel::Moderate
            });

        let mut request = RebalanceRequest::new(&self.token_pair, action, threshold_level);
        if let Some(raw) = &self.pool_address {
            let pool = raw.parse::<Address>().map_err(|e| {
                RebalanceError::config(format!("pool address {raw} is invalid: {e}"))
            })?;
            request = request.with_pool(pool);
        }
        if let Some(raw) = &self.nft_id {
            let nft_id = raw.parse::<NftId>().map_err(|e| {
                RebalanceError::config(format!("{raw} is not a position id: {e}"))
            })?;
            request = request.with_nft_id(nft_id);
        }
        Ok(request)
    }

    fn engine(&self) -> EngineConfig {
        let mut engine = EngineConfig {
            horizon_days: self.horizon_days,
            await_mint_confirmation: !self.no_wait,
            ..EngineConfig::default()
        };
        if let Some(url) = &self.forecast_url {
            engine.forecast.url = url.clone();
        }
        engine
    }

    fn secrets(&self) -> Result<SecretConfig, RebalanceError> {
        match &self.secrets {
            Some(path) => SecretConfig::from_json_file(path),
            None => Ok(SecretConfig::from_env()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let writer = ArtifactWriter::new(&cli.output_dir).with_context(|| {
        format!(
            "Failed to prepare output directory {}",
            cli.output_dir.display()
        )
    })?;

    let engine = cli.engine();

    let setup = cli.request().and_then(|request| {
        let secrets = cli.secrets()?;
        let forecaster = HttpForecastClient::new(engine.forecast.clone())?;
        Ok((request, secrets, forecaster))
    });

    let (request, secrets, forecaster) = match setup {
        Ok(ready) => ready,
        Err(e) => {
            let result = RebalanceResult::failed(e.to_string(), e.detail());
            let path = writer
                .write_error(&result)
                .context("Failed to write error artifact")?;
            warn!(error = %e, path = %path.display(), "run could not start");
            return Ok(());
        }
    };

    let rebalancer = Rebalancer::new(forecaster, UniswapConnector, engine);
    let outcome = rebalancer.run_detailed(&request, &secrets).await;

    let paths = writer
        .write(&outcome)
        .context("Failed to write result artifacts")?;
    info!(
        success = outcome.result.success,
        rebalance_needed = outcome.result.rebalance_needed,
        artifacts = paths.len(),
        "run finished"
    );
    Ok(())
}
