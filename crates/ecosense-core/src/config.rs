//! Analysis configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::recommend::RecommendationCatalog;
use crate::scoring::PenaltyConfig;
use crate::thresholds::ThresholdConfig;

/// Everything that tunes classification, scoring and reporting.
///
/// Every field has a default, so a partial TOML table such as
///
/// ```toml
/// completeness_warning = 0.9
///
/// [penalties]
/// poor = 40
///
/// [recommendations]
/// "co2.poor" = "Open the windows."
/// ```
///
/// deserializes into a complete configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub thresholds: ThresholdConfig,
    pub penalties: PenaltyConfig,
    /// Recommendation text overrides keyed by `"<channel>.<band>"`.
    pub recommendations: BTreeMap<String, String>,
    /// Channels below this completeness ratio get a warning.
    pub completeness_warning: f64,
    /// Relative change (fraction of the baseline) treated as stable.
    pub trend_dead_band: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            penalties: PenaltyConfig::default(),
            recommendations: BTreeMap::new(),
            completeness_warning: 0.8,
            trend_dead_band: 0.02,
        }
    }
}

impl AnalysisConfig {
    /// Default configuration with strict thresholds.
    pub fn strict() -> Self {
        Self {
            thresholds: ThresholdConfig::strict(),
            ..Self::default()
        }
    }

    /// Default configuration with relaxed thresholds.
    pub fn relaxed() -> Self {
        Self {
            thresholds: ThresholdConfig::relaxed(),
            ..Self::default()
        }
    }

    /// Check every table and ratio.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.penalties.validate()?;
        RecommendationCatalog::with_overrides(&self.recommendations)?;
        if !(0.0..=1.0).contains(&self.completeness_warning) {
            return Err(Error::InvalidConfig(format!(
                "completeness_warning must be between 0 and 1, got {}",
                self.completeness_warning
            )));
        }
        if !(self.trend_dead_band.is_finite() && self.trend_dead_band >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "trend_dead_band must be a non-negative number, got {}",
                self.trend_dead_band
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        AnalysisConfig::default().validate().unwrap();
        AnalysisConfig::strict().validate().unwrap();
        AnalysisConfig::relaxed().validate().unwrap();
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{"penalties":{"poor":40},"recommendations":{"co2.poor":"Open the windows."}}"#,
        )
        .unwrap();
        assert_eq!(config.penalties.poor, 40);
        assert_eq!(config.penalties.moderate, 15);
        assert_eq!(config.completeness_warning, 0.8);
        assert_eq!(config.thresholds, ThresholdConfig::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_ratios() {
        let config = AnalysisConfig {
            completeness_warning: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            trend_dead_band: -0.1,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_recommendation_key() {
        let mut config = AnalysisConfig::default();
        config
            .recommendations
            .insert("noise.poor".to_string(), "x".to_string());
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
