//! Weighted combination of per-asset return series.

use std::collections::BTreeMap;

use crate::returns::compute_returns;
use crate::types::{Observation, PriceSeries, ReturnSeries};
use crate::{Error, Result};

use super::WeightVector;

/// Combine per-asset returns into one weighted portfolio return series.
///
/// Series are inner-joined on date: a date missing from any asset is dropped
/// entirely. Missing `weights` means equal weights. Weights that do not sum
/// to 1.0 are renormalized (see [`WeightVector::normalized`]).
pub fn combine(
    returns_by_asset: &BTreeMap<String, ReturnSeries>,
    weights: Option<&WeightVector>,
) -> Result<ReturnSeries> {
    if returns_by_asset.is_empty() {
        return Err(Error::EmptyInput("no asset return series".to_string()));
    }

    let uniform;
    let weights = match weights {
        Some(w) => w,
        None => {
            uniform = WeightVector::uniform(returns_by_asset.keys().cloned());
            &uniform
        }
    };

    if weights.len() != returns_by_asset.len() {
        return Err(Error::DimensionMismatch {
            weights: weights.len(),
            assets: returns_by_asset.len(),
        });
    }
    if let Some((asset, _)) = weights
        .iter()
        .find(|(asset, _)| !returns_by_asset.contains_key(*asset))
    {
        return Err(Error::UnknownAsset(asset.to_string()));
    }

    let effective = weights.normalized()?;
    let columns: Vec<(&ReturnSeries, f64)> = returns_by_asset
        .iter()
        .map(|(asset, series)| (series, effective.get(asset).unwrap_or(0.0)))
        .collect();

    // Any column can drive the join; every kept date must exist in all of them.
    let (driver, _) = columns[0];
    let points: Vec<Observation> = driver
        .iter()
        .filter_map(|obs| {
            columns
                .iter()
                .map(|(series, weight)| series.get(obs.date).map(|r| r * weight))
                .sum::<Option<f64>>()
                .map(|value| Observation::new(obs.date, value))
        })
        .collect();

    if points.is_empty() {
        return Err(Error::EmptyIntersection(returns_by_asset.len()));
    }

    tracing::debug!(
        "Combined {} assets into {} portfolio returns",
        returns_by_asset.len(),
        points.len()
    );
    Ok(ReturnSeries::from_ordered(points))
}

/// Derive returns for every asset from prices, then combine them.
pub fn portfolio_returns_from_prices(
    prices_by_asset: &BTreeMap<String, PriceSeries>,
    weights: Option<&WeightVector>,
) -> Result<ReturnSeries> {
    let returns = prices_by_asset
        .iter()
        .map(|(asset, prices)| Ok((asset.clone(), compute_returns(prices)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    combine(&returns, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn two_assets() -> BTreeMap<String, ReturnSeries> {
        let start = day(1);
        BTreeMap::from([
            (
                "A".to_string(),
                ReturnSeries::from_values(start, &[0.01, -0.02, 0.015, 0.005]).unwrap(),
            ),
            (
                "B".to_string(),
                ReturnSeries::from_values(start, &[0.005, -0.01, 0.01, 0.0]).unwrap(),
            ),
        ])
    }

    #[test]
    fn test_combine_weighted() {
        let weights = WeightVector::new([("A", 0.6), ("B", 0.4)]);
        let portfolio = combine(&two_assets(), Some(&weights)).unwrap();

        let expected = [0.008, -0.016, 0.013, 0.003];
        assert_eq!(portfolio.len(), expected.len());
        for (actual, expected) in portfolio.values().iter().zip(expected) {
            assert_abs_diff_eq!(*actual, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_combine_renormalizes_scaled_weights() {
        let scaled = WeightVector::new([("A", 60.0), ("B", 40.0)]);
        let unit = WeightVector::new([("A", 0.6), ("B", 0.4)]);

        let a = combine(&two_assets(), Some(&scaled)).unwrap();
        let b = combine(&two_assets(), Some(&unit)).unwrap();
        for (x, y) in a.values().iter().zip(b.values()) {
            assert_abs_diff_eq!(*x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_combine_defaults_to_uniform() {
        let portfolio = combine(&two_assets(), None).unwrap();
        assert_abs_diff_eq!(portfolio.values()[0], 0.0075, epsilon = 1e-12);
    }

    #[test]
    fn test_combine_inner_join() {
        let returns = BTreeMap::from([
            (
                "A".to_string(),
                ReturnSeries::from_pairs(vec![(day(1), 0.01), (day(2), 0.02), (day(3), 0.03)])
                    .unwrap(),
            ),
            (
                "B".to_string(),
                ReturnSeries::from_pairs(vec![(day(2), 0.04), (day(3), 0.05), (day(4), 0.06)])
                    .unwrap(),
            ),
        ]);

        let portfolio = combine(&returns, None).unwrap();
        assert_eq!(portfolio.dates(), vec![day(2), day(3)]);
        assert_abs_diff_eq!(portfolio.values()[0], 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_combine_dimension_mismatch() {
        let weights = WeightVector::new([("A", 1.0)]);
        assert!(matches!(
            combine(&two_assets(), Some(&weights)),
            Err(Error::DimensionMismatch {
                weights: 1,
                assets: 2
            })
        ));
    }

    #[test]
    fn test_combine_unknown_asset() {
        let weights = WeightVector::new([("A", 0.5), ("C", 0.5)]);
        assert!(matches!(
            combine(&two_assets(), Some(&weights)),
            Err(Error::UnknownAsset(asset)) if asset == "C"
        ));
    }

    #[test]
    fn test_combine_empty_intersection() {
        let returns = BTreeMap::from([
            (
                "A".to_string(),
                ReturnSeries::from_pairs(vec![(day(1), 0.01)]).unwrap(),
            ),
            (
                "B".to_string(),
                ReturnSeries::from_pairs(vec![(day(2), 0.02)]).unwrap(),
            ),
        ]);
        assert!(matches!(
            combine(&returns, None),
            Err(Error::EmptyIntersection(2))
        ));
    }

    #[test]
    fn test_portfolio_returns_from_prices() {
        let prices = BTreeMap::from([
            (
                "A".to_string(),
                PriceSeries::from_values(day(1), &[100.0, 110.0, 121.0]).unwrap(),
            ),
            (
                "B".to_string(),
                PriceSeries::from_values(day(1), &[50.0, 50.0, 45.0]).unwrap(),
            ),
        ]);
        let weights = WeightVector::new([("A", 0.5), ("B", 0.5)]);

        let portfolio = portfolio_returns_from_prices(&prices, Some(&weights)).unwrap();
        assert_abs_diff_eq!(portfolio.values()[0], 0.05, epsilon = 1e-12);
        assert_abs_diff_eq!(portfolio.values()[1], 0.0, epsilon = 1e-12);
    }
}
