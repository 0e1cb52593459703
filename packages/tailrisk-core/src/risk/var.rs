//! Closed-form and empirical VaR.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::stats::{percentile, validate_confidence};
use crate::{Error, Result};

use super::{finite_sample, fit_normal};

/// Historical VaR: the negated `(1 - confidence)` percentile of returns.
///
/// # Arguments
///
/// * `returns` - Single-period returns (e.g., 0.01 for 1%)
/// * `confidence` - Confidence level in (0, 1), typically 0.95
///
/// # Returns
///
/// Loss threshold exceeded by `1 - confidence` of the sample.
pub fn historical_var(returns: &[f64], confidence: f64) -> Result<f64> {
    validate_confidence(confidence)?;

    let sample = finite_sample(returns);
    let var = -percentile(&sample, (1.0 - confidence) * 100.0)?;

    tracing::debug!("Historical VaR @ {:.0}%: {:.4}", confidence * 100.0, var);
    Ok(var)
}

/// Parametric (Gaussian) VaR: `-(mu + z * sigma)` with `z` the `1 - confidence`
/// standard normal quantile.
pub fn parametric_var(returns: &[f64], confidence: f64) -> Result<f64> {
    validate_confidence(confidence)?;

    let (mu, sigma) = fit_normal(returns)?;
    let var = -(mu + z_score(1.0 - confidence)? * sigma);

    tracing::debug!("Parametric VaR @ {:.0}%: {:.4}", confidence * 100.0, var);
    Ok(var)
}

/// Standard normal quantile at probability `p`, from the exact inverse CDF.
///
/// `p` must lie strictly between 0 and 1.
pub fn z_score(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "quantile probability must lie strictly between 0 and 1, got {}",
            p
        )));
    }
    let standard = Normal::new(0.0, 1.0).map_err(|e| Error::InvalidParameter(e.to_string()))?;
    Ok(standard.inverse_cdf(p))
}
