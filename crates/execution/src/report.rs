//! Plain-text rebalance report.

use crate::strategy::RunOutcome;
use std::fmt;

const RULE: &str = "════════════════════════════════════════════";

/// Renders the human-readable report for a run.
pub fn render(outcome: &RunOutcome) -> String {
    Report(outcome).to_string()
}

struct Report<'a>(&'a RunOutcome);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;
        let result = &outcome.result;
        let request = &outcome.request;

        writeln!(f, "Volatility Rebalance Report")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Generated:       {}", result.timestamp.to_rfc3339())?;
        writeln!(f)?;

        writeln!(f, "Configuration")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Token Pair:      {}", request.token_pair)?;
        writeln!(f, "Action:          {}", request.action)?;
        writeln!(f, "Threshold Level: {}", request.threshold_level)?;
        if let Some(chain) = &outcome.chain {
            writeln!(f, "Chain ID:        {}", chain.chain_id)?;
            writeln!(f, "Owner:           {}", chain.owner)?;
            writeln!(f, "NFT Manager:     {}", chain.nft_manager)?;
            writeln!(f, "Pool:            {}", chain.pool)?;
            if let (Some(t0), Some(t1)) = (chain.token0, chain.token1) {
                writeln!(f, "Token0:          {t0}")?;
                writeln!(f, "Token1:          {t1}")?;
            }
            if let Some(tick) = chain.current_tick {
                writeln!(f, "Current Tick:    {tick}")?;
            }
            if let Some(price) = chain.current_price {
                writeln!(f, "Current Price:   {price:.6}")?;
            }
            if let Some(deposit) = &chain.deposit {
                writeln!(
                    f,
                    "Deposit:         {} / {} ({}% of base)",
                    deposit.token_a, deposit.token_b, deposit.percent_of_base
                )?;
            }
            if let Some((amount0, amount1)) = &chain.mint_amounts {
                writeln!(f, "Mint Amounts:    {amount0} / {amount1}")?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Volatility Analysis")?;
        writeln!(f, "{RULE}")?;
        if let Some(forecast) = &outcome.forecast {
            if forecast.used_fallback_pair() {
                writeln!(
                    f,
                    "Note:            {} unsupported, forecast used {}",
                    forecast.requested_pair, forecast.trading_pair
                )?;
            }
            writeln!(f, "Forecast Pair:   {}", forecast.trading_pair)?;
            writeln!(f, "Horizon:         {} days", forecast.horizon_days)?;
            writeln!(
                f,
                "Predicted 5d:    {}%",
                forecast.predicted_5d_volatility_pct
            )?;
            writeln!(f, "Annualized:      {}%", forecast.annualized_volatility_pct)?;
            writeln!(f, "Risk Level:      {}", forecast.risk_level)?;
        }
        if let Some(vol) = &result.volatility {
            writeln!(f, "Threshold:       {}%", vol.threshold)?;
        }
        writeln!(f)?;

        writeln!(f, "Rebalance Outcome")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Success:         {}", result.success)?;
        writeln!(f, "Needed:          {}", result.rebalance_needed)?;
        if let Some(summary) = &result.rebalance {
            let closed: Vec<String> = summary
                .closed_positions
                .iter()
                .map(ToString::to_string)
                .collect();
            writeln!(f, "Closed:          [{}]", closed.join(", "))?;
            match summary.new_position_tx {
                Some(tx) => writeln!(f, "New Position Tx: {tx}")?,
                None => writeln!(f, "New Position Tx: none")?,
            }
            if let Some(tx) = summary.pending_tx {
                writeln!(f, "Pending Mint Tx: {tx} (unconfirmed)")?;
            }
            if let Some(range) = summary.tick_range {
                writeln!(f, "Tick Range:      [{}, {}]", range.lower(), range.upper())?;
            }
            writeln!(f, "Message:         {}", summary.message)?;
        }
        if let Some(error) = &result.error {
            writeln!(f, "Error:           {error}")?;
        }

        if !outcome.closed.is_empty() {
            writeln!(f)?;
            writeln!(f, "Closed Positions")?;
            writeln!(f, "{RULE}")?;
            for position in &outcome.closed {
                write!(f, "{}", position.summary())?;
            }
        }

        if !outcome.events.is_empty() {
            writeln!(f)?;
            writeln!(f, "Events")?;
            writeln!(f, "{RULE}")?;
            for event in &outcome.events {
                writeln!(f, "{event}")?;
            }
        }
        Ok(())
    }
}
