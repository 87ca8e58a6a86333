//! Config command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use ecosense_core::AnalysisConfig;

use crate::cli::{ConfigAction, ConfigKey, OutputFormat, Preset};
use crate::config::Config;
use crate::style;

pub fn cmd_config(action: ConfigAction, no_color: bool) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let path = Config::path();
            if !path.exists() {
                println!(
                    "{}",
                    style::format_info(
                        &format!("No configuration file at {}", path.display()),
                        no_color
                    )
                );
                println!("Run 'ecosense config init' to create one.");
                return Ok(());
            }
            let config = Config::load();
            let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
            println!("# {}", path.display());
            print!("{}", content);
        }
        ConfigAction::Get { key } => {
            let config = Config::load();
            match get_value(&config, key) {
                Some(value) => println!("{}", value),
                None => println!("(not set)"),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load();
            set_value(&mut config, key, &value)?;
            config.save()?;
            println!(
                "{}",
                style::format_success(&format!("Set {} = {}", key_name(key), value), no_color)
            );
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load();
            unset_value(&mut config, key);
            config.save()?;
            println!(
                "{}",
                style::format_success(&format!("Unset {}", key_name(key)), no_color)
            );
        }
        ConfigAction::Path => {
            println!("{}", Config::path().display());
        }
        ConfigAction::Init => {
            let path = Config::path();
            if path.exists() {
                bail!("Configuration file already exists: {}", path.display());
            }
            let config = Config {
                preset: Some(Preset::Default.name().to_string()),
                analysis: Some(AnalysisConfig::default()),
                ..Default::default()
            };
            config.save()?;
            println!(
                "{}",
                style::format_success(&format!("Created {}", path.display()), no_color)
            );
        }
    }
    Ok(())
}

fn key_name(key: ConfigKey) -> &'static str {
    match key {
        ConfigKey::Data => "data",
        ConfigKey::Format => "format",
        ConfigKey::NoColor => "no_color",
        ConfigKey::Preset => "preset",
    }
}

fn get_value(config: &Config, key: ConfigKey) -> Option<String> {
    match key {
        ConfigKey::Data => config.data.as_ref().map(|p| p.display().to_string()),
        ConfigKey::Format => config.format.clone(),
        ConfigKey::NoColor => Some(config.no_color.to_string()),
        ConfigKey::Preset => config.preset.clone(),
    }
}

fn set_value(config: &mut Config, key: ConfigKey, value: &str) -> Result<()> {
    match key {
        ConfigKey::Data => config.data = Some(PathBuf::from(value)),
        ConfigKey::Format => {
            if OutputFormat::from_config(value).is_none() {
                bail!("Invalid format '{}'. Use text, json or csv.", value);
            }
            config.format = Some(value.to_lowercase());
        }
        ConfigKey::NoColor => {
            config.no_color = value
                .parse()
                .with_context(|| format!("Invalid value '{}'. Use true or false.", value))?;
        }
        ConfigKey::Preset => {
            let Some(preset) = Preset::from_config(value) else {
                bail!("Invalid preset '{}'. Use default, strict or relaxed.", value);
            };
            config.preset = Some(preset.name().to_string());
        }
    }
    Ok(())
}

fn unset_value(config: &mut Config, key: ConfigKey) {
    match key {
        ConfigKey::Data => config.data = None,
        ConfigKey::Format => config.format = None,
        ConfigKey::NoColor => config.no_color = false,
        ConfigKey::Preset => config.preset = None,
    }
}
