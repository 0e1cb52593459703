//! Tailrisk CLI - Command line interface for risk analyses.
//!
//! Reads dated prices from a JSON file and prints a JSON `ApiResponse`.
//!
//! Input format:
//!
//! ```json
//! {
//!   "prices": { "AAPL": [{ "date": "2024-01-02", "value": 185.6 }, ...] },
//!   "weights": { "AAPL": 1.0 }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tailrisk_core::{
    capm_for_assets, compute_returns, AnalysisConfig, ApiResponse, Error, PriceSeries,
    PriceSummary, Result, ReturnInput, ReturnSeries, RiskAnalyzer, WeightVector,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tailrisk")]
#[command(about = "Tailrisk CLI - portfolio VaR/CVaR and CAPM analysis")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML); defaults to the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value at Risk of the weighted portfolio
    Var {
        #[command(flatten)]
        args: RiskArgs,
    },
    /// Conditional Value at Risk of the weighted portfolio
    Cvar {
        #[command(flatten)]
        args: RiskArgs,
    },
    /// CAPM of every asset against a market series from the same file
    Capm {
        /// Price input file (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Identifier of the market proxy series
        #[arg(short, long)]
        market: String,
        /// Annual risk-free rate (0.04 = 4%)
        #[arg(short, long, default_value = "0.0")]
        risk_free: f64,
    },
    /// Price performance summary per asset
    Summary {
        /// Price input file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(clap::Args)]
struct RiskArgs {
    /// Price input file (JSON)
    #[arg(short, long)]
    input: PathBuf,
    /// Seed for the Monte Carlo random source
    #[arg(short, long)]
    seed: Option<u64>,
    /// Override the configured confidence level
    #[arg(short, long)]
    confidence: Option<f64>,
    /// Scale results to an annual horizon
    #[arg(long)]
    annualize: bool,
    /// Include the heavy-tail Monte Carlo estimate
    #[arg(long)]
    heavy_tail: bool,
}

/// Contents of a price input file.
#[derive(Debug, Deserialize)]
struct PriceInput {
    prices: BTreeMap<String, PriceSeries>,
    #[serde(default)]
    weights: Option<WeightVector>,
}

impl PriceInput {
    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn returns(&self) -> Result<BTreeMap<String, ReturnSeries>> {
        self.prices
            .iter()
            .map(|(id, prices)| Ok((id.clone(), compute_returns(prices)?)))
            .collect()
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(AnalysisConfig::default_path);

    let output = match cli.command {
        Commands::Var { args } => respond(handle_risk(&config_path, args, false)),
        Commands::Cvar { args } => respond(handle_risk(&config_path, args, true)),
        Commands::Capm {
            input,
            market,
            risk_free,
        } => respond(handle_capm(&input, &market, risk_free)),
        Commands::Summary { input } => respond(handle_summary(&config_path, &input)),
    };

    println!("{}", output);
}

fn respond<T: Serialize>(result: Result<T>) -> String {
    let rendered = match result {
        Ok(data) => serde_json::to_string_pretty(&ApiResponse::ok(data)),
        Err(e) => {
            tracing::error!("{}", e);
            serde_json::to_string_pretty(&ApiResponse::<()>::err(e.to_string()))
        }
    };
    rendered.unwrap_or_else(|e| fallback_error(&e))
}

/// Minimal error envelope for when the full response cannot be serialized.
fn fallback_error(e: &dyn std::fmt::Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

fn handle_risk(config_path: &Path, args: RiskArgs, cvar: bool) -> Result<serde_json::Value> {
    let mut config = AnalysisConfig::load(config_path)?;
    if let Some(confidence) = args.confidence {
        config.confidence_level = confidence;
    }
    config.annualize |= args.annualize;
    config.include_heavy_tail |= args.heavy_tail;

    let input = PriceInput::load(&args.input)?;
    let returns = ReturnInput::Multi {
        returns: input.returns()?,
        weights: input.weights,
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut analyzer = RiskAnalyzer::seeded(config, seed)?;
    let report = if cvar {
        analyzer.cvar(&returns)?
    } else {
        analyzer.var(&returns)?
    };

    Ok(json!({
        "metrics": report.named_metrics(),
        "report": report,
        "seed": seed,
    }))
}

fn handle_capm(input: &Path, market: &str, risk_free: f64) -> Result<serde_json::Value> {
    let mut returns = PriceInput::load(input)?.returns()?;
    let market_returns = returns
        .remove(market)
        .ok_or_else(|| Error::UnknownAsset(market.to_string()))?;

    let results = capm_for_assets(&returns, &market_returns, risk_free)?;
    Ok(json!({
        "market": market,
        "risk_free_rate": risk_free,
        "results": results,
    }))
}

fn handle_summary(config_path: &Path, input: &Path) -> Result<BTreeMap<String, PriceSummary>> {
    let config = AnalysisConfig::load(config_path)?;
    PriceInput::load(input)?
        .prices
        .iter()
        .map(|(id, prices)| {
            Ok((
                id.clone(),
                PriceSummary::from_prices(prices, config.periods_per_year)?,
            ))
        })
        .collect()
}
