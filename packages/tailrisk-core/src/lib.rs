//! Tailrisk Core - Portfolio downside-risk and market-exposure analytics.
//!
//! This crate turns historical price series into risk numbers:
//!
//! - **Returns**: Simple percentage-change returns from dated prices
//! - **Portfolio aggregation**: Inner-joined, weighted portfolio returns
//! - **Risk estimators**: Historical, parametric, Monte Carlo and heavy-tailed
//!   Monte Carlo VaR, plus CVaR derived from any VaR estimate
//! - **Reporting**: Ordered, optionally annualized risk reports
//! - **CAPM**: Beta, alpha, R² and expected return against a market proxy
//!
//! Every computation is a pure function of its inputs. Monte Carlo paths take
//! the random source as an explicit argument, so seeding is up to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use rand::{rngs::StdRng, SeedableRng};
//! use tailrisk_core::{analyze_var, AnalysisConfig, ReturnSeries};
//!
//! let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//! let returns = ReturnSeries::from_values(start, &[0.01, -0.02, 0.015, 0.005]).unwrap();
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let report = analyze_var(&returns, &AnalysisConfig::default(), &mut rng).unwrap();
//! for (name, value) in report.named_metrics() {
//!     println!("{name}: {value:.4}");
//! }
//! ```

pub mod analyzer;
pub mod capm;
pub mod config;
pub mod portfolio;
pub mod report;
pub mod returns;
pub mod risk;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, CapmResult, Observation, PriceSeries, ReturnSeries, RiskEstimate, RiskMethod,
    TimeSeries,
};

// Re-export main functionality
pub use analyzer::{ReturnInput, RiskAnalyzer};
pub use capm::{capm_fit, capm_for_assets, compute_capm, CapmFit, LinearFit, TRADING_DAYS};
pub use config::AnalysisConfig;
pub use portfolio::{combine, portfolio_returns_from_prices, WeightVector};
pub use report::{
    analyze_cvar, analyze_portfolio_cvar, analyze_portfolio_var, analyze_var, scale_to_annual,
    Histogram, RiskMeasure, RiskReport,
};
pub use returns::{compute_returns, PriceSummary};
pub use risk::{
    calculate_cvar, heavy_tail_var, historical_var, inject_crash_events, monte_carlo_var,
    parametric_var, z_score, HeavyTailParams,
};

/// Error types for tailrisk-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Dimension mismatch: {weights} weights for {assets} assets")]
    DimensionMismatch { weights: usize, assets: usize },

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("No common timestamps across {0} asset series")]
    EmptyIntersection(usize),

    #[error("No overlapping observations: {0}")]
    NoOverlap(String),

    #[error("Confidence level must lie strictly between 0 and 1, got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("No returns fall below -VaR ({var:.6}); CVaR is undefined")]
    UndefinedTail { var: f64 },

    #[error("Not a properly indexed time series: {0}")]
    TypeMismatch(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for tailrisk-core operations.
pub type Result<T> = std::result::Result<T, Error>;
