//! Core data types for the risk engine.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single dated observation (a price or a return).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    /// Observation date
    pub date: NaiveDate,
    /// Observed value
    pub value: f64,
}

impl Observation {
    /// Create a new observation.
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A strictly date-ordered series of observations with no duplicate dates.
///
/// Serialized as a plain list of `{ "date": ..., "value": ... }` objects;
/// deserialization re-checks the ordering invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct TimeSeries {
    points: Vec<Observation>,
}

/// Prices of one instrument.
pub type PriceSeries = TimeSeries;

/// Fractional returns of one instrument or portfolio.
pub type ReturnSeries = TimeSeries;

impl TimeSeries {
    /// Build a series, rejecting unordered or duplicated dates.
    pub fn new(points: Vec<Observation>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(Error::TypeMismatch(format!(
                "date {} does not strictly follow {}",
                pair[1].date, pair[0].date
            )));
        }
        Ok(Self { points })
    }

    /// Build a series from `(date, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| Observation::new(date, value))
                .collect(),
        )
    }

    /// Build a series of consecutive calendar days starting at `start`.
    pub fn from_values(start: NaiveDate, values: &[f64]) -> Result<Self> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                start
                    .checked_add_days(Days::new(i as u64))
                    .map(|date| Observation::new(date, value))
                    .ok_or_else(|| {
                        Error::InvalidParameter(format!("date overflow after {} days", i))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { points })
    }

    /// Wrap points already known to be strictly ordered.
    pub(crate) fn from_ordered(points: Vec<Observation>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        Self { points }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All observations in date order.
    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    /// Iterate over observations in date order.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.points.iter()
    }

    /// Observation dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Observation values in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Value observed on `date`, if any.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// First observation.
    pub fn first(&self) -> Option<&Observation> {
        self.points.first()
    }

    /// Last observation.
    pub fn last(&self) -> Option<&Observation> {
        self.points.last()
    }
}

impl TryFrom<Vec<Observation>> for TimeSeries {
    type Error = Error;

    fn try_from(points: Vec<Observation>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<TimeSeries> for Vec<Observation> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// VaR estimation method.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RiskMethod {
    Historical,
    Parametric,
    MonteCarlo,
    MonteCarloHeavyTail,
}

impl RiskMethod {
    /// Human-readable method label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskMethod::Historical => "Historical",
            RiskMethod::Parametric => "Parametric",
            RiskMethod::MonteCarlo => "Monte Carlo",
            RiskMethod::MonteCarloHeavyTail => "Monte Carlo Heavy Tail",
        }
    }

    /// Machine identifier, matching the serialized form.
    pub fn id(&self) -> &'static str {
        match self {
            RiskMethod::Historical => "historical",
            RiskMethod::Parametric => "parametric",
            RiskMethod::MonteCarlo => "monte_carlo",
            RiskMethod::MonteCarloHeavyTail => "monte_carlo_heavy_tail",
        }
    }
}

/// A method-tagged loss estimate. Losses are positive, gains negative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskEstimate {
    /// Estimation method
    pub method: RiskMethod,
    /// Confidence level the estimate was taken at
    pub confidence_level: f64,
    /// Loss magnitude
    pub value: f64,
    /// Whether `value` was scaled to an annual horizon
    pub annualized: bool,
}

/// CAPM regression result for one asset against one market proxy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CapmResult {
    /// OLS slope of excess asset returns on excess market returns
    pub beta: f64,
    /// OLS intercept (per period)
    pub alpha: f64,
    /// Coefficient of determination of the fit
    pub r_squared: f64,
    /// Annualized CAPM expected return
    pub expected_return: f64,
    /// Number of aligned, finite observations used in the fit
    pub observations: usize,
}

impl CapmResult {
    /// Metrics keyed by display name, in a fixed order.
    pub fn named_metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Beta", self.beta),
            ("Alpha", self.alpha),
            ("R²", self.r_squared),
            ("Expected Return", self.expected_return),
        ]
    }
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
