//! Configuration file management.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use ecosense_core::{AnalysisConfig, ThresholdConfig};

use crate::cli::{OutputFormat, Preset};

/// Configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default sensor data file
    #[serde(default)]
    pub data: Option<PathBuf>,

    /// Default output format
    #[serde(default)]
    pub format: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,

    /// Threshold preset: "default", "strict" or "relaxed"
    #[serde(default)]
    pub preset: Option<String>,

    /// Analysis tuning (thresholds, penalties, recommendation text)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisConfig>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ecosense")
            .join("config.toml")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        let path = Self::path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Resolve output format: `--json` wins, then `--format`, then config, then text.
pub fn resolve_format(json: bool, format: Option<OutputFormat>, config: &Config) -> OutputFormat {
    if json {
        return OutputFormat::Json;
    }
    format
        .or_else(|| config.format.as_deref().and_then(OutputFormat::from_config))
        .unwrap_or_default()
}

/// Resolve the preset from the flag, falling back to config.
pub fn resolve_preset(preset: Option<Preset>, config: &Config) -> Result<Option<Preset>> {
    if preset.is_some() {
        return Ok(preset);
    }
    match config.preset.as_deref() {
        None => Ok(None),
        Some(name) => match Preset::from_config(name) {
            Some(p) => Ok(Some(p)),
            None => bail!(
                "Unknown preset '{}' in config. Use default, strict or relaxed.",
                name
            ),
        },
    }
}

/// Build the analysis configuration.
///
/// Starts from the `[analysis]` table (or defaults); a preset replaces only
/// the threshold tables.
pub fn resolve_analysis(preset: Option<Preset>, config: &Config) -> AnalysisConfig {
    let mut analysis = config.analysis.clone().unwrap_or_default();
    if let Some(preset) = preset {
        analysis.thresholds = match preset {
            Preset::Default => ThresholdConfig::default(),
            Preset::Strict => ThresholdConfig::strict(),
            Preset::Relaxed => ThresholdConfig::relaxed(),
        };
    }
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.data.is_none());
        assert!(config.format.is_none());
        assert!(!config.no_color);
        assert!(config.analysis.is_none());
    }

    #[test]
    fn test_config_path_ends_with_ecosense() {
        let path = Config::path();
        assert!(path.ends_with("ecosense/config.toml"));
    }

    #[test]
    fn test_config_partial_toml() {
        let toml_str = r#"
data = "/var/data/building_413.csv"
preset = "strict"

[analysis]
completeness_warning = 0.9

[analysis.penalties]
poor = 40
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.data,
            Some(PathBuf::from("/var/data/building_413.csv"))
        );
        let analysis = config.analysis.unwrap();
        assert_eq!(analysis.completeness_warning, 0.9);
        assert_eq!(analysis.penalties.poor, 40);
        assert_eq!(analysis.penalties.moderate, 15);
    }

    #[test]
    fn test_config_serialization_skips_empty_analysis() {
        let config = Config {
            format: Some("json".to_string()),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("format = \"json\""));
        assert!(!toml_str.contains("[analysis]"));
    }

    #[test]
    fn test_resolve_format_precedence() {
        let config = Config {
            format: Some("csv".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_format(true, Some(OutputFormat::Text), &config), OutputFormat::Json);
        assert_eq!(resolve_format(false, Some(OutputFormat::Text), &config), OutputFormat::Text);
        assert_eq!(resolve_format(false, None, &config), OutputFormat::Csv);
        assert_eq!(resolve_format(false, None, &Config::default()), OutputFormat::Text);
    }

    #[test]
    fn test_resolve_preset_prefers_flag() {
        let config = Config {
            preset: Some("relaxed".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_preset(Some(Preset::Strict), &config).unwrap(),
            Some(Preset::Strict)
        );
        assert_eq!(resolve_preset(None, &config).unwrap(), Some(Preset::Relaxed));
    }

    #[test]
    fn test_resolve_preset_rejects_unknown_name() {
        let config = Config {
            preset: Some("lenient".to_string()),
            ..Default::default()
        };
        assert!(resolve_preset(None, &config).is_err());
    }

    #[test]
    fn test_preset_replaces_only_thresholds() {
        let mut analysis = AnalysisConfig::default();
        analysis.penalties.poor = 50;
        let config = Config {
            analysis: Some(analysis),
            ..Default::default()
        };
        let resolved = resolve_analysis(Some(Preset::Strict), &config);
        assert_eq!(resolved.thresholds, ThresholdConfig::strict());
        assert_eq!(resolved.penalties.poor, 50);

        let unchanged = resolve_analysis(None, &config);
        assert_eq!(unchanged.thresholds, ThresholdConfig::default());
    }
}
