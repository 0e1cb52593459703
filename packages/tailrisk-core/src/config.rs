//! Analysis configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::risk::HeavyTailParams;
use crate::stats::validate_confidence;
use crate::{Error, Result};

/// Tunable inputs of a risk analysis.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// confidence_level = 0.99
/// include_heavy_tail = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Confidence level for VaR/CVaR (e.g., 0.95 for 95%)
    pub confidence_level: f64,
    /// Monte Carlo simulation count
    pub simulations: usize,
    /// Student-t degrees of freedom for the heavy-tail simulation
    pub degrees_of_freedom: f64,
    /// Per-draw crash probability for the heavy-tail simulation
    pub crash_probability: f64,
    /// Return shock applied on a crash
    pub crash_magnitude: f64,
    /// Scale single-period values to an annual horizon
    pub annualize: bool,
    /// Trading periods per year used for annualization
    pub periods_per_year: u32,
    /// Add the heavy-tail Monte Carlo estimate to reports
    pub include_heavy_tail: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            simulations: 10_000,
            degrees_of_freedom: 5.0,
            crash_probability: 0.01,
            crash_magnitude: -0.20,
            annualize: false,
            periods_per_year: 252,
            include_heavy_tail: false,
        }
    }
}

impl AnalysisConfig {
    /// Get the default configuration file path.
    ///
    /// Default path: `<config dir>/tailrisk/config.toml`
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "tailrisk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("tailrisk.toml"))
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<()> {
        validate_confidence(self.confidence_level)?;

        if self.simulations == 0 {
            return Err(Error::InvalidParameter(
                "simulations must be positive".to_string(),
            ));
        }
        if !(self.degrees_of_freedom > 0.0 && self.degrees_of_freedom.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "degrees_of_freedom must be positive, got {}",
                self.degrees_of_freedom
            )));
        }
        if !(0.0..=1.0).contains(&self.crash_probability) {
            return Err(Error::InvalidParameter(format!(
                "crash_probability must be within [0, 1], got {}",
                self.crash_probability
            )));
        }
        if !self.crash_magnitude.is_finite() {
            return Err(Error::InvalidParameter(
                "crash_magnitude must be finite".to_string(),
            ));
        }
        if self.periods_per_year == 0 {
            return Err(Error::InvalidParameter(
                "periods_per_year must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Heavy-tail simulation parameters drawn from this configuration.
    pub fn heavy_tail(&self) -> HeavyTailParams {
        HeavyTailParams {
            simulations: self.simulations,
            degrees_of_freedom: self.degrees_of_freedom,
            crash_probability: self.crash_probability,
            crash_magnitude: self.crash_magnitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.confidence_level, 0.95);
        assert_eq!(config.simulations, 10_000);
        assert_eq!(config.degrees_of_freedom, 5.0);
        assert_eq!(config.crash_probability, 0.01);
        assert_eq!(config.crash_magnitude, -0.20);
        assert!(!config.annualize);
        assert_eq!(config.periods_per_year, 252);
        assert!(config.validate().is_ok());
        assert_eq!(config.heavy_tail(), HeavyTailParams::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = AnalysisConfig::from_toml_str(
            "confidence_level = 0.99\ninclude_heavy_tail = true\n",
        )
        .unwrap();
        assert_eq!(config.confidence_level, 0.99);
        assert!(config.include_heavy_tail);
        assert_eq!(config.simulations, 10_000);
    }

    #[test]
    fn test_invalid_toml_values() {
        assert!(matches!(
            AnalysisConfig::from_toml_str("confidence_level = 1.0"),
            Err(Error::InvalidConfidenceLevel(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("crash_probability = 2.0"),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml_str("simulations = \"many\""),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        // Missing file falls back to defaults
        assert_eq!(AnalysisConfig::load(&path).unwrap(), AnalysisConfig::default());

        fs::write(&path, "annualize = true\nperiods_per_year = 52\n").unwrap();
        let config = AnalysisConfig::load(&path).unwrap();
        assert!(config.annualize);
        assert_eq!(config.periods_per_year, 52);
    }
}
