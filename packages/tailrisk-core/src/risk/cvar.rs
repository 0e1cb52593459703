//! Conditional Value-at-Risk (Expected Shortfall).

use crate::stats::mean;
use crate::{Error, Result};

/// CVaR given a VaR estimate: `-mean(returns[returns < -var])`.
///
/// Fails with [`Error::UndefinedTail`] when no return lies beyond `-var`,
/// whichever method produced `var`.
pub fn calculate_cvar(returns: &[f64], var: f64) -> Result<f64> {
    let tail: Vec<f64> = returns.iter().copied().filter(|&r| r < -var).collect();
    if tail.is_empty() {
        return Err(Error::UndefinedTail { var });
    }

    let cvar = -mean(&tail);
    tracing::debug!(
        "CVaR (given VaR={:.4}, {} tail returns): {:.4}",
        var,
        tail.len(),
        cvar
    );
    Ok(cvar)
}
