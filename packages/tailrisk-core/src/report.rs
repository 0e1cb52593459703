//! Annualization and assembly of risk reports.
//!
//! Reports are plain data: the presentation layer decides how to print or
//! chart them.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::portfolio::{combine, WeightVector};
use crate::risk::{calculate_cvar, heavy_tail_var, historical_var, monte_carlo_var, parametric_var};
use crate::types::{ReturnSeries, RiskEstimate, RiskMethod};
use crate::{Error, Result};

/// Scale a single-period value to an annual horizon (square-root-of-time).
pub fn scale_to_annual(value: f64, periods_per_year: u32) -> f64 {
    value * f64::from(periods_per_year).sqrt()
}

/// Which risk measure a report holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskMeasure {
    Var,
    Cvar,
}

impl RiskMeasure {
    fn prefix(&self) -> &'static str {
        match self {
            RiskMeasure::Var => "VaR",
            RiskMeasure::Cvar => "CVaR",
        }
    }
}

/// Estimates of one risk measure across methods, in a fixed method order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    /// VaR or CVaR
    pub measure: RiskMeasure,
    /// Confidence level shared by all estimates
    pub confidence_level: f64,
    /// Whether the estimates were annualized
    pub annualized: bool,
    /// Number of returns the estimates were computed from
    pub observations: usize,
    /// Estimates ordered historical, parametric, Monte Carlo, heavy tail
    pub estimates: Vec<RiskEstimate>,
}

impl RiskReport {
    /// Estimate of one method, if present.
    pub fn get(&self, method: RiskMethod) -> Option<f64> {
        self.estimates
            .iter()
            .find(|e| e.method == method)
            .map(|e| e.value)
    }

    /// Estimates keyed by display name, e.g. `"VaR (Historical)"`.
    pub fn named_metrics(&self) -> Vec<(String, f64)> {
        self.estimates
            .iter()
            .map(|e| {
                (
                    format!("{} ({})", self.measure.prefix(), e.method.label()),
                    e.value,
                )
            })
            .collect()
    }
}

/// VaR of a return series by every configured method.
pub fn analyze_var<R: Rng + ?Sized>(
    returns: &ReturnSeries,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<RiskReport> {
    config.validate()?;
    let values = returns.values();
    let raw = var_estimates(&values, config, rng)?;
    Ok(build_report(RiskMeasure::Var, raw, values.len(), config))
}

/// VaR of a weighted portfolio of assets.
pub fn analyze_portfolio_var<R: Rng + ?Sized>(
    returns_by_asset: &BTreeMap<String, ReturnSeries>,
    weights: Option<&WeightVector>,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<RiskReport> {
    let portfolio = combine(returns_by_asset, weights)?;
    analyze_var(&portfolio, config, rng)
}

/// CVaR of a return series, derived from each configured VaR method.
///
/// Fails with [`Error::UndefinedTail`] if any VaR estimate lies beyond the
/// worst observed return.
pub fn analyze_cvar<R: Rng + ?Sized>(
    returns: &ReturnSeries,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<RiskReport> {
    config.validate()?;
    let values = returns.values();
    let raw = var_estimates(&values, config, rng)?
        .into_iter()
        .map(|(method, var)| Ok((method, calculate_cvar(&values, var)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(build_report(RiskMeasure::Cvar, raw, values.len(), config))
}

/// CVaR of a weighted portfolio of assets.
pub fn analyze_portfolio_cvar<R: Rng + ?Sized>(
    returns_by_asset: &BTreeMap<String, ReturnSeries>,
    weights: Option<&WeightVector>,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<RiskReport> {
    let portfolio = combine(returns_by_asset, weights)?;
    analyze_cvar(&portfolio, config, rng)
}

/// Single-period VaR per method, in report order.
fn var_estimates<R: Rng + ?Sized>(
    values: &[f64],
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<Vec<(RiskMethod, f64)>> {
    let confidence = config.confidence_level;
    let mut estimates = vec![
        (RiskMethod::Historical, historical_var(values, confidence)?),
        (RiskMethod::Parametric, parametric_var(values, confidence)?),
        (
            RiskMethod::MonteCarlo,
            monte_carlo_var(values, confidence, config.simulations, rng)?,
        ),
    ];
    if config.include_heavy_tail {
        estimates.push((
            RiskMethod::MonteCarloHeavyTail,
            heavy_tail_var(values, confidence, &config.heavy_tail(), rng)?,
        ));
    }
    Ok(estimates)
}

fn build_report(
    measure: RiskMeasure,
    raw: Vec<(RiskMethod, f64)>,
    observations: usize,
    config: &AnalysisConfig,
) -> RiskReport {
    let estimates: Vec<RiskEstimate> = raw
        .into_iter()
        .map(|(method, value)| RiskEstimate {
            method,
            confidence_level: config.confidence_level,
            value: if config.annualize {
                scale_to_annual(value, config.periods_per_year)
            } else {
                value
            },
            annualized: config.annualize,
        })
        .collect();

    let report = RiskReport {
        measure,
        confidence_level: config.confidence_level,
        annualized: config.annualize,
        observations,
        estimates,
    };

    tracing::info!(
        "{} analysis over {} returns @ {:.0}%",
        measure.prefix(),
        observations,
        config.confidence_level * 100.0
    );
    for (name, value) in report.named_metrics() {
        tracing::info!("{}: {:.4}", name, value);
    }
    report
}

/// Equal-width histogram of a return sample, for distribution charts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Histogram {
    /// Bin edges, one more than the number of bins
    pub edges: Vec<f64>,
    /// Observation count per bin
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite values into `bins` equal-width bins.
    ///
    /// The last bin is closed on the right. A constant sample is centered in
    /// a unit-wide range.
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(Error::InvalidParameter(
                "histogram needs at least one bin".to_string(),
            ));
        }
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Err(Error::InsufficientData(
                "no finite values to bin".to_string(),
            ));
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Ok(Self { edges, counts })
    }
}
