//! CAPM regression of asset returns on market returns.
//!
//! Both series are inner-joined on date, reduced to excess returns over the
//! per-period risk-free rate, stripped of non-finite points and fitted by OLS:
//! `excess_asset = alpha + beta * excess_market`.

mod regression;

pub use regression::LinearFit;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::stats::mean;
use crate::types::{CapmResult, ReturnSeries};
use crate::{Error, Result};

/// Trading days per year; converts the annual risk-free rate to a daily one.
pub const TRADING_DAYS: f64 = 252.0;

/// Plot-ready regression data: aligned excess returns and the fitted line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapmFit {
    /// Dates of the points used in the fit
    pub dates: Vec<NaiveDate>,
    /// Excess market returns (x axis)
    pub excess_market: Vec<f64>,
    /// Excess asset returns (y axis)
    pub excess_asset: Vec<f64>,
    /// Fitted line
    pub line: LinearFit,
}

impl CapmFit {
    /// Fitted excess asset return at every excess market return.
    pub fn fitted(&self) -> Vec<f64> {
        self.excess_market
            .iter()
            .map(|&x| self.line.predict(x))
            .collect()
    }
}

/// Aligned, filtered excess returns ready for regression.
struct ExcessReturns {
    dates: Vec<NaiveDate>,
    asset: Vec<f64>,
    market: Vec<f64>,
    /// Mean raw market return over the aligned window
    market_mean: f64,
}

fn excess_returns(
    asset: &ReturnSeries,
    market: &ReturnSeries,
    risk_free_annual: f64,
) -> Result<ExcessReturns> {
    if asset.is_empty() {
        return Err(Error::EmptyInput("asset return series".to_string()));
    }
    if market.is_empty() {
        return Err(Error::EmptyInput("market return series".to_string()));
    }
    if !risk_free_annual.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "risk-free rate must be finite, got {}",
            risk_free_annual
        )));
    }

    let aligned: Vec<(NaiveDate, f64, f64)> = asset
        .iter()
        .filter_map(|obs| market.get(obs.date).map(|m| (obs.date, obs.value, m)))
        .collect();
    tracing::debug!(
        "Aligned {} asset and {} market returns into {} points",
        asset.len(),
        market.len(),
        aligned.len()
    );
    if aligned.is_empty() {
        return Err(Error::NoOverlap(
            "asset and market share no dates".to_string(),
        ));
    }

    let market_values: Vec<f64> = aligned
        .iter()
        .map(|&(_, _, m)| m)
        .filter(|m| m.is_finite())
        .collect();
    let market_mean = mean(&market_values);

    let daily_risk_free = risk_free_annual / TRADING_DAYS;
    let mut out = ExcessReturns {
        dates: Vec::with_capacity(aligned.len()),
        asset: Vec::with_capacity(aligned.len()),
        market: Vec::with_capacity(aligned.len()),
        market_mean,
    };
    for (date, a, m) in &aligned {
        let excess_asset = a - daily_risk_free;
        let excess_market = m - daily_risk_free;
        if excess_asset.is_finite() && excess_market.is_finite() {
            out.dates.push(*date);
            out.asset.push(excess_asset);
            out.market.push(excess_market);
        }
    }

    let dropped = aligned.len() - out.dates.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} non-finite excess return pairs", dropped);
    }
    if out.dates.is_empty() {
        return Err(Error::NoOverlap(
            "no finite excess return pairs after filtering".to_string(),
        ));
    }
    Ok(out)
}

/// CAPM metrics of one asset against a market proxy.
///
/// # Arguments
///
/// * `asset` - Asset returns
/// * `market` - Market index returns
/// * `risk_free_annual` - Annual risk-free rate (e.g., 0.04 for 4%)
///
/// # Returns
///
/// Beta and alpha of the excess-return regression, its R², and the annualized
/// expected return `rf + beta * (mean(market) * 252 - rf)`.
pub fn compute_capm(
    asset: &ReturnSeries,
    market: &ReturnSeries,
    risk_free_annual: f64,
) -> Result<CapmResult> {
    let excess = excess_returns(asset, market, risk_free_annual)?;
    let line = LinearFit::fit(&excess.market, &excess.asset)?;

    let expected_return = risk_free_annual
        + line.slope * (excess.market_mean * TRADING_DAYS - risk_free_annual);

    let result = CapmResult {
        beta: line.slope,
        alpha: line.intercept,
        r_squared: line.r_squared,
        expected_return,
        observations: excess.dates.len(),
    };
    tracing::debug!(
        "Beta: {:.4}, Alpha: {:.4}, R²: {:.4}, Expected return: {:.4}",
        result.beta,
        result.alpha,
        result.r_squared,
        result.expected_return
    );
    Ok(result)
}

/// Aligned excess returns and fitted line for a scatter/fit chart.
pub fn capm_fit(
    asset: &ReturnSeries,
    market: &ReturnSeries,
    risk_free_annual: f64,
) -> Result<CapmFit> {
    let excess = excess_returns(asset, market, risk_free_annual)?;
    let line = LinearFit::fit(&excess.market, &excess.asset)?;
    Ok(CapmFit {
        dates: excess.dates,
        excess_market: excess.market,
        excess_asset: excess.asset,
        line,
    })
}

/// CAPM of every asset against the same market series, keyed by asset.
pub fn capm_for_assets(
    assets: &BTreeMap<String, ReturnSeries>,
    market: &ReturnSeries,
    risk_free_annual: f64,
) -> Result<BTreeMap<String, CapmResult>> {
    assets
        .iter()
        .map(|(id, returns)| {
            tracing::info!("CAPM analysis for {}", id);
            Ok((id.clone(), compute_capm(returns, market, risk_free_annual)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    fn market() -> ReturnSeries {
        ReturnSeries::from_values(
            day(1),
            &[0.01, -0.005, 0.012, -0.02, 0.007, 0.003, -0.011, 0.016],
        )
        .unwrap()
    }

    // Asset whose excess return is exactly `beta` times the market's
    fn levered(market: &ReturnSeries, beta: f64, risk_free_annual: f64) -> ReturnSeries {
        let rf = risk_free_annual / TRADING_DAYS;
        ReturnSeries::from_pairs(
            market
                .iter()
                .map(|obs| (obs.date, rf + beta * (obs.value - rf))),
        )
        .unwrap()
    }

    #[test]
    fn test_capm_recovers_exact_beta() {
        let market = market();
        let asset = levered(&market, 2.0, 0.04);

        let result = compute_capm(&asset, &market, 0.04).unwrap();
        assert_abs_diff_eq!(result.beta, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.alpha, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.r_squared, 1.0, epsilon = 1e-9);
        assert_eq!(result.observations, 8);
    }

    #[test]
    fn test_capm_two_points() {
        let market = ReturnSeries::from_values(day(1), &[0.01, -0.02]).unwrap();
        let asset = levered(&market, 2.0, 0.0);

        let result = compute_capm(&asset, &market, 0.0).unwrap();
        assert_abs_diff_eq!(result.beta, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.alpha, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.r_squared, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_capm_expected_return() {
        let market = market();
        let asset = levered(&market, 1.5, 0.03);
        let result = compute_capm(&asset, &market, 0.03).unwrap();

        let market_mean = mean(&market.values());
        let expected = 0.03 + result.beta * (market_mean * TRADING_DAYS - 0.03);
        assert_abs_diff_eq!(result.expected_return, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_capm_aligns_on_common_dates() {
        let market = market();
        // Asset only trades on a subset of days, plus one the market lacks
        let asset = ReturnSeries::from_pairs(vec![
            (day(2), 2.0 * -0.005),
            (day(3), 2.0 * 0.012),
            (day(4), 2.0 * -0.02),
            (day(20), 0.5),
        ])
        .unwrap();

        let fit = capm_fit(&asset, &market, 0.0).unwrap();
        assert_eq!(fit.dates, vec![day(2), day(3), day(4)]);
        assert_abs_diff_eq!(fit.line.slope, 2.0, epsilon = 1e-12);
        assert_eq!(fit.fitted().len(), 3);
    }

    #[test]
    fn test_capm_filters_non_finite() {
        let market = market();
        let mut points: Vec<(NaiveDate, f64)> = levered(&market, 2.0, 0.0)
            .iter()
            .map(|obs| (obs.date, obs.value))
            .collect();
        points[3].1 = f64::NAN;
        points[5].1 = f64::INFINITY;
        let asset = ReturnSeries::from_pairs(points).unwrap();

        let result = compute_capm(&asset, &market, 0.0).unwrap();
        assert_eq!(result.observations, 6);
        assert_abs_diff_eq!(result.beta, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_capm_empty_input() {
        let empty = ReturnSeries::default();
        assert!(matches!(
            compute_capm(&empty, &market(), 0.02),
            Err(Error::EmptyInput(_))
        ));
        assert!(matches!(
            compute_capm(&market(), &empty, 0.02),
            Err(Error::EmptyInput(_))
        ));
    }

    #[test]
    fn test_capm_no_overlap() {
        let asset = ReturnSeries::from_values(day(20), &[0.01, 0.02]).unwrap();
        assert!(matches!(
            compute_capm(&asset, &market(), 0.02),
            Err(Error::NoOverlap(_))
        ));

        let nan_asset = ReturnSeries::from_values(day(1), &[f64::NAN, f64::NAN]).unwrap();
        assert!(matches!(
            compute_capm(&nan_asset, &market(), 0.02),
            Err(Error::NoOverlap(_))
        ));
    }

    #[test]
    fn test_capm_for_assets() {
        let market = market();
        let assets = BTreeMap::from([
            ("AAPL".to_string(), levered(&market, 1.2, 0.02)),
            ("MSFT".to_string(), levered(&market, 0.8, 0.02)),
        ]);

        let results = capm_for_assets(&assets, &market, 0.02).unwrap();
        assert_eq!(results.len(), 2);
        assert_abs_diff_eq!(results["AAPL"].beta, 1.2, epsilon = 1e-9);
        assert_abs_diff_eq!(results["MSFT"].beta, 0.8, epsilon = 1e-9);
    }
}
