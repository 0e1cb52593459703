//! Value-at-Risk and Conditional Value-at-Risk estimators.
//!
//! All estimators work on a slice of single-period returns and report losses
//! as positive numbers (risk is measured on `-return`).
//!
//! - **Historical**: empirical quantile of the sample
//! - **Parametric**: Gaussian quantile from the sample mean and deviation
//! - **Monte Carlo**: empirical quantile of simulated Gaussian returns
//! - **Heavy tail**: Student-t simulation with injected crash events
//! - **CVaR**: mean loss beyond any of the above

mod cvar;
mod monte_carlo;
mod var;

pub use cvar::calculate_cvar;
pub use monte_carlo::{heavy_tail_var, inject_crash_events, monte_carlo_var, HeavyTailParams};
pub use var::{historical_var, parametric_var, z_score};

use crate::stats::{mean, sample_std};
use crate::{Error, Result};

/// Finite values of `returns`; NaN and infinities carry no information.
fn finite_sample(returns: &[f64]) -> Vec<f64> {
    returns.iter().copied().filter(|r| r.is_finite()).collect()
}

/// Fit a normal distribution: sample mean and sample standard deviation.
fn fit_normal(returns: &[f64]) -> Result<(f64, f64)> {
    let sample = finite_sample(returns);
    if sample.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Need at least 2 returns to fit a distribution, got {}",
            sample.len()
        )));
    }
    Ok((mean(&sample), sample_std(&sample)))
}
