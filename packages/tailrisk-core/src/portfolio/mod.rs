//! Portfolio return aggregation.
//!
//! Provides weight vectors and inner-joined, weighted combination of per-asset
//! return series.

mod aggregate;
mod weights;

pub use aggregate::{combine, portfolio_returns_from_prices};
pub use weights::{WeightVector, WEIGHT_SUM_TOLERANCE};
