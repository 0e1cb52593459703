//! Simulation-based VaR.
//!
//! The caller supplies the random source. Seed it (e.g. `StdRng::seed_from_u64`)
//! for reproducible estimates; give each concurrent analysis its own generator.

use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Normal, StudentT};
use serde::{Deserialize, Serialize};

use crate::stats::{percentile, validate_confidence};
use crate::{Error, Result};

use super::fit_normal;

/// Parameters of the heavy-tailed simulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HeavyTailParams {
    /// Number of simulated returns
    pub simulations: usize,
    /// Student-t degrees of freedom
    pub degrees_of_freedom: f64,
    /// Per-draw probability of a crash event
    pub crash_probability: f64,
    /// Return shock added on a crash (negative)
    pub crash_magnitude: f64,
}

impl Default for HeavyTailParams {
    fn default() -> Self {
        Self {
            simulations: 10_000,
            degrees_of_freedom: 5.0,
            crash_probability: 0.01,
            crash_magnitude: -0.20,
        }
    }
}

/// Monte Carlo VaR from a normal distribution fitted to `returns`.
///
/// Draws `simulations` returns from Normal(mu, sigma) and takes the negated
/// `(1 - confidence)` percentile.
pub fn monte_carlo_var<R: Rng + ?Sized>(
    returns: &[f64],
    confidence: f64,
    simulations: usize,
    rng: &mut R,
) -> Result<f64> {
    validate_confidence(confidence)?;
    check_simulations(simulations)?;

    let (mu, sigma) = fit_normal(returns)?;
    let normal = Normal::new(mu, sigma).map_err(|e| {
        Error::InvalidParameter(format!("normal fit (mu={}, sigma={}): {}", mu, sigma, e))
    })?;

    let simulated: Vec<f64> = (0..simulations).map(|_| normal.sample(rng)).collect();
    let var = -percentile(&simulated, (1.0 - confidence) * 100.0)?;

    tracing::debug!(
        "Monte Carlo VaR @ {:.0}% ({} paths): {:.4}",
        confidence * 100.0,
        simulations,
        var
    );
    Ok(var)
}

/// Heavy-tailed Monte Carlo VaR.
///
/// Draws `mu + sigma * t` with `t` from a Student-t distribution, then adds
/// `crash_magnitude` to each draw independently with `crash_probability`.
pub fn heavy_tail_var<R: Rng + ?Sized>(
    returns: &[f64],
    confidence: f64,
    params: &HeavyTailParams,
    rng: &mut R,
) -> Result<f64> {
    validate_confidence(confidence)?;
    check_simulations(params.simulations)?;

    let (mu, sigma) = fit_normal(returns)?;
    let student = StudentT::new(params.degrees_of_freedom).map_err(|e| {
        Error::InvalidParameter(format!(
            "degrees of freedom {}: {}",
            params.degrees_of_freedom, e
        ))
    })?;

    let mut simulated: Vec<f64> = (0..params.simulations)
        .map(|_| mu + sigma * student.sample(rng))
        .collect();
    inject_crash_events(
        &mut simulated,
        params.crash_probability,
        params.crash_magnitude,
        rng,
    )?;

    let var = -percentile(&simulated, (1.0 - confidence) * 100.0)?;
    tracing::debug!(
        "Monte Carlo VaR (heavy tail, df={}) @ {:.0}%: {:.4}",
        params.degrees_of_freedom,
        confidence * 100.0,
        var
    );
    Ok(var)
}

/// Add `crash_magnitude` to each simulated return with `crash_probability`.
///
/// Returns the number of crashes injected.
pub fn inject_crash_events<R: Rng + ?Sized>(
    simulated: &mut [f64],
    crash_probability: f64,
    crash_magnitude: f64,
    rng: &mut R,
) -> Result<usize> {
    let crash = Bernoulli::new(crash_probability).map_err(|_| {
        Error::InvalidParameter(format!(
            "crash probability must be within [0, 1], got {}",
            crash_probability
        ))
    })?;

    let mut crashes = 0;
    for value in simulated.iter_mut() {
        if crash.sample(rng) {
            *value += crash_magnitude;
            crashes += 1;
        }
    }

    tracing::debug!(
        "Injected {} crashes of magnitude {}",
        crashes,
        crash_magnitude
    );
    Ok(crashes)
}

fn check_simulations(simulations: usize) -> Result<()> {
    if simulations == 0 {
        return Err(Error::InvalidParameter(
            "simulation count must be positive".to_string(),
        ));
    }
    Ok(())
}
