//! Portfolio weight vectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Weights whose sum is within this distance of 1.0 are used as given.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Mapping from asset identifier to portfolio weight.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct WeightVector {
    weights: BTreeMap<String, f64>,
}

impl WeightVector {
    /// Create a weight vector from `(asset, weight)` pairs.
    pub fn new<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            weights: weights
                .into_iter()
                .map(|(asset, weight)| (asset.into(), weight))
                .collect(),
        }
    }

    /// Equal weights `1/N` over the given assets.
    pub fn uniform<I, S>(assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let assets: Vec<String> = assets.into_iter().map(Into::into).collect();
        let weight = 1.0 / assets.len() as f64;
        Self::new(assets.into_iter().map(|asset| (asset, weight)))
    }

    /// Number of weighted assets.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether the vector is empty.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight of one asset.
    pub fn get(&self, asset: &str) -> Option<f64> {
        self.weights.get(asset).copied()
    }

    /// Iterate over `(asset, weight)` in asset order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(asset, &weight)| (asset.as_str(), weight))
    }

    /// Raw sum of the weights.
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Effective weights summing to 1.0.
    ///
    /// Returns a renormalized copy when the raw sum is off by more than
    /// [`WEIGHT_SUM_TOLERANCE`]; `self` is left untouched.
    pub fn normalized(&self) -> Result<WeightVector> {
        let sum = self.sum();
        if !sum.is_finite() || sum == 0.0 {
            return Err(Error::InvalidParameter(format!(
                "weights must have a finite, non-zero sum, got {}",
                sum
            )));
        }

        if (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE {
            return Ok(self.clone());
        }

        tracing::warn!("Weights sum to {:.6}, renormalizing", sum);
        Ok(Self {
            weights: self
                .weights
                .iter()
                .map(|(asset, weight)| (asset.clone(), weight / sum))
                .collect(),
        })
    }
}
