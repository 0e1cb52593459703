//! Stateful entry point bundling configuration and a random source.

use std::borrow::Cow;
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::portfolio::{combine, WeightVector};
use crate::report::{analyze_cvar, analyze_var, RiskReport};
use crate::types::ReturnSeries;
use crate::Result;

/// Returns to analyze: one series, or several assets with optional weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnInput {
    /// A single asset or an already-aggregated portfolio
    Single(ReturnSeries),
    /// Per-asset returns combined with `weights` (uniform when absent)
    Multi {
        returns: BTreeMap<String, ReturnSeries>,
        #[serde(default)]
        weights: Option<WeightVector>,
    },
}

impl ReturnInput {
    /// The single return series the estimators run on.
    pub fn resolve(&self) -> Result<Cow<'_, ReturnSeries>> {
        match self {
            ReturnInput::Single(series) => Ok(Cow::Borrowed(series)),
            ReturnInput::Multi { returns, weights } => {
                Ok(Cow::Owned(combine(returns, weights.as_ref())?))
            }
        }
    }
}

/// Runs risk analyses with a fixed configuration and its own random source.
///
/// Each analyzer owns its generator, so analyzers on different threads never
/// share random state.
#[derive(Debug)]
pub struct RiskAnalyzer<R> {
    config: AnalysisConfig,
    rng: R,
}

impl<R: Rng> RiskAnalyzer<R> {
    /// Create an analyzer, validating the configuration up front.
    pub fn new(config: AnalysisConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    /// Get the configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// VaR report for the input.
    pub fn var(&mut self, input: &ReturnInput) -> Result<RiskReport> {
        let returns = input.resolve()?;
        analyze_var(&returns, &self.config, &mut self.rng)
    }

    /// CVaR report for the input.
    pub fn cvar(&mut self, input: &ReturnInput) -> Result<RiskReport> {
        let returns = input.resolve()?;
        analyze_cvar(&returns, &self.config, &mut self.rng)
    }
}

impl RiskAnalyzer<StdRng> {
    /// Analyzer with a deterministic generator seeded from `seed`.
    pub fn seeded(config: AnalysisConfig, seed: u64) -> Result<Self> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}
