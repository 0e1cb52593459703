//! Single-factor ordinary least squares.

use serde::{Deserialize, Serialize};

use crate::stats::mean;
use crate::{Error, Result};

/// Fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LinearFit {
    /// Slope coefficient
    pub slope: f64,
    /// Intercept
    pub intercept: f64,
    /// Coefficient of determination
    pub r_squared: f64,
}

impl LinearFit {
    /// Fit `y` on `x` by ordinary least squares.
    ///
    /// Needs at least two points and a non-constant `x`. When `y` is constant
    /// R² is 1.0 for an exact fit and 0.0 otherwise.
    pub fn fit(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::InvalidParameter(format!(
                "regression inputs differ in length: {} vs {}",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "Need at least 2 points for a regression, got {}",
                x.len()
            )));
        }

        let x_mean = mean(x);
        let y_mean = mean(y);

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (xi, yi) in x.iter().zip(y) {
            sxx += (xi - x_mean).powi(2);
            sxy += (xi - x_mean) * (yi - y_mean);
        }
        if sxx == 0.0 {
            return Err(Error::InsufficientData(
                "regressor has zero variance".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let ss_res: f64 = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (yi - (intercept + slope * xi)).powi(2))
            .sum();
        let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Fitted value at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}
