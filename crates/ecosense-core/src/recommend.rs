//! Actionable recommendations for deficient channels.
//!
//! Texts come from a built-in `(channel, band)` table with a per-grade
//! fallback. Individual entries can be overridden from configuration using
//! `"<channel>.<band>"` keys, e.g. `"co2.poor"`.

use std::collections::BTreeMap;

use serde::Serialize;

use ecosense_types::{Channel, ConditionBand, Grade};

use crate::error::{Error, Result};
use crate::scoring::Deficiency;

/// One ranked recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    /// 1 is the most urgent.
    pub rank: usize,
    pub channel: Channel,
    pub band: ConditionBand,
    pub grade: Grade,
    pub penalty: u32,
    pub text: String,
}

fn builtin(channel: Channel, band: ConditionBand) -> Option<&'static str> {
    use ConditionBand::*;
    let text = match (channel, band) {
        (Channel::Co2, Moderate) => {
            "CO2 is elevated. Increase fresh-air ventilation during occupied hours."
        }
        (Channel::Co2, Poor) => {
            "CO2 is high. Raise ventilation rates or reduce occupancy density; check that air handling units are running on schedule."
        }
        (Channel::Temperature, Cold) => {
            "Spaces run cold. Review heating setpoints and check for drafts or poor insulation."
        }
        (Channel::Temperature, Warm) => {
            "Spaces run warm. Lower heating setpoints or increase cooling and shading; each degree saved reduces energy use."
        }
        (Channel::Temperature, Hot) => {
            "Spaces are overheating. Check HVAC operation and solar gain, and add shading or night purge ventilation."
        }
        (Channel::Humidity, Dry) => {
            "Air is dry. Consider humidification and reduce over-ventilation in cold weather."
        }
        (Channel::Humidity, Humid) => {
            "Humidity is elevated. Improve ventilation and verify dehumidification is working."
        }
        (Channel::Humidity, Damp) => {
            "Humidity is very high and risks mould. Inspect for leaks and increase dehumidification."
        }
        (Channel::Light, Dim) => {
            "Lighting is below task levels. Make better use of daylight or upgrade to efficient LED fixtures."
        }
        (Channel::Light, Excessive) => {
            "Lighting exceeds what occupants need. Install occupancy and daylight sensors and dim or switch off unused zones."
        }
        (Channel::Motion, Crowded) => {
            "Occupancy is very high. Spread usage across spaces and schedule ventilation to match peak hours."
        }
        _ => return None,
    };
    Some(text)
}

fn fallback(grade: Grade) -> &'static str {
    match grade {
        Grade::Excellent | Grade::Good => "No action needed.",
        Grade::Moderate => "Conditions need attention. Review operating schedules and setpoints.",
        Grade::Poor => "Conditions are poor. Investigate building systems and take corrective action.",
    }
}

/// Lookup table from `(channel, band)` to recommendation text.
#[derive(Debug, Clone, Default)]
pub struct RecommendationCatalog {
    overrides: BTreeMap<(Channel, ConditionBand), String>,
}

impl RecommendationCatalog {
    /// Catalog with only the built-in texts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with configured overrides.
    ///
    /// Keys have the form `"<channel>.<band>"`; unknown names are
    /// [`Error::InvalidConfig`].
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut parsed = BTreeMap::new();
        for (key, text) in overrides {
            let (channel, band) = key.split_once('.').ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "recommendation key '{key}' must look like '<channel>.<band>'"
                ))
            })?;
            let channel: Channel = channel
                .parse()
                .map_err(|e| Error::InvalidConfig(format!("recommendation key '{key}': {e}")))?;
            let band: ConditionBand = band
                .parse()
                .map_err(|e| Error::InvalidConfig(format!("recommendation key '{key}': {e}")))?;
            parsed.insert((channel, band), text.clone());
        }
        Ok(Self { overrides: parsed })
    }

    /// Text for a channel in a band.
    pub fn text(&self, channel: Channel, band: ConditionBand) -> String {
        if let Some(text) = self.overrides.get(&(channel, band)) {
            return text.clone();
        }
        if let Some(text) = builtin(channel, band) {
            return text.to_string();
        }
        band.grade()
            .map_or("Not enough data to assess this channel.", fallback)
            .to_string()
    }

    /// Ranked recommendations, in the order of the given deficiencies.
    pub fn recommend(&self, deficiencies: &[Deficiency]) -> Vec<Recommendation> {
        deficiencies
            .iter()
            .enumerate()
            .map(|(i, d)| Recommendation {
                rank: i + 1,
                channel: d.channel,
                band: d.band,
                grade: d.grade,
                penalty: d.penalty,
                text: self.text(d.channel, d.band),
            })
            .collect()
    }
}
