//! Descriptive statistics shared by the estimators.

use crate::{Error, Result};

/// Arithmetic mean. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns NaN for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Percentile `q` (0..=100) with linear interpolation between closest ranks.
///
/// Equivalent to the "linear" method: rank `q/100 * (n - 1)` on the sorted
/// sample.
pub fn percentile(values: &[f64], q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "Percentile of an empty sample".to_string(),
        ));
    }
    if !(0.0..=100.0).contains(&q) {
        return Err(Error::InvalidParameter(format!(
            "percentile must be within [0, 100], got {}",
            q
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Fail unless `confidence` lies strictly inside (0, 1).
pub fn validate_confidence(confidence: f64) -> Result<()> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfidenceLevel(confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_and_sample_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(mean(&values), 5.0);
        // Sum of squared deviations is 32, n - 1 = 7
        assert_abs_diff_eq!(sample_std(&values), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [0.013, -0.016, 0.003, 0.008];
        // rank 0.15 between -0.016 and 0.003
        let p5 = percentile(&values, 5.0).unwrap();
        assert_abs_diff_eq!(p5, -0.016 + 0.15 * 0.019, epsilon = 1e-12);

        assert_abs_diff_eq!(percentile(&values, 0.0).unwrap(), -0.016);
        assert_abs_diff_eq!(percentile(&values, 100.0).unwrap(), 0.013);
        assert_abs_diff_eq!(percentile(&values, 50.0).unwrap(), 0.0055, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_empty() {
        assert!(matches!(
            percentile(&[], 5.0),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_validate_confidence() {
        assert!(validate_confidence(0.95).is_ok());
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                validate_confidence(bad),
                Err(Error::InvalidConfidenceLevel(_))
            ));
        }
    }
}
