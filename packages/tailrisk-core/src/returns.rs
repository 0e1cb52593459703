//! Return derivation from price series.

use serde::{Deserialize, Serialize};

use crate::stats::sample_std;
use crate::types::{Observation, PriceSeries, ReturnSeries};
use crate::{Error, Result};

/// Convert prices into simple percentage-change returns.
///
/// `r[i] = p[i] / p[i-1] - 1`, dated at `p[i]`. Non-finite results (from a
/// zero or NaN price) are dropped rather than replaced.
pub fn compute_returns(prices: &PriceSeries) -> Result<ReturnSeries> {
    if prices.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "Need at least 2 prices to derive a return, got {}",
            prices.len()
        )));
    }

    let points = prices.points();
    let returns: Vec<Observation> = points
        .windows(2)
        .map(|w| Observation::new(w[1].date, w[1].value / w[0].value - 1.0))
        .filter(|obs| obs.value.is_finite())
        .collect();

    let dropped = points.len() - 1 - returns.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} non-finite returns", dropped);
    }

    Ok(ReturnSeries::from_ordered(returns))
}

/// Price performance summary over the supplied window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSummary {
    /// Most recent price
    pub last_price: f64,
    /// Highest price in the window
    pub high: f64,
    /// Lowest price in the window
    pub low: f64,
    /// Sum of simple returns over the window
    pub total_return: f64,
    /// Sample volatility scaled by the square root of `periods_per_year`
    pub annualized_volatility: f64,
}

impl PriceSummary {
    /// Summarize a price series.
    pub fn from_prices(prices: &PriceSeries, periods_per_year: u32) -> Result<Self> {
        let returns = compute_returns(prices)?.values();
        if returns.len() < 2 {
            return Err(Error::InsufficientData(
                "Need at least 2 finite returns for volatility".to_string(),
            ));
        }

        let finite = prices.iter().map(|p| p.value).filter(|v| v.is_finite());
        let (high, low) = finite.fold((f64::NEG_INFINITY, f64::INFINITY), |(hi, lo), v| {
            (hi.max(v), lo.min(v))
        });
        let last_price = prices.last().map(|p| p.value).unwrap_or(f64::NAN);

        Ok(Self {
            last_price,
            high,
            low,
            total_return: returns.iter().sum(),
            annualized_volatility: sample_std(&returns) * f64::from(periods_per_year).sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn test_compute_returns() {
        let prices = PriceSeries::from_values(start(), &[100.0, 110.0, 99.0, 99.0]).unwrap();
        let returns = compute_returns(&prices).unwrap();

        assert_eq!(returns.len(), 3);
        let values = returns.values();
        assert_abs_diff_eq!(values[0], 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(values[1], -0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(values[2], 0.0, epsilon = 1e-12);

        // Dated at the later price
        assert_eq!(returns.first().unwrap().date, prices.points()[1].date);
    }

    #[test]
    fn test_compute_returns_drops_non_finite() {
        let prices =
            PriceSeries::from_values(start(), &[100.0, 0.0, 50.0, f64::NAN, 60.0]).unwrap();
        let returns = compute_returns(&prices).unwrap();

        // 100 -> 0 is -1.0 (finite); 0 -> 50 is inf; both NaN steps vanish
        assert_eq!(returns.values(), vec![-1.0]);
        assert!(returns.iter().all(|r| r.value.is_finite()));
    }

    #[test]
    fn test_compute_returns_insufficient_data() {
        let prices = PriceSeries::from_values(start(), &[100.0]).unwrap();
        assert!(matches!(
            compute_returns(&prices),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_price_summary() {
        let prices = PriceSeries::from_values(start(), &[100.0, 102.0, 98.0, 101.0]).unwrap();
        let summary = PriceSummary::from_prices(&prices, 252).unwrap();

        assert_eq!(summary.last_price, 101.0);
        assert_eq!(summary.high, 102.0);
        assert_eq!(summary.low, 98.0);

        let r = [0.02, 98.0 / 102.0 - 1.0, 101.0 / 98.0 - 1.0];
        assert_abs_diff_eq!(summary.total_return, r.iter().sum::<f64>(), epsilon = 1e-12);
        assert_abs_diff_eq!(
            summary.annualized_volatility,
            sample_std(&r) * 252.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }
}
