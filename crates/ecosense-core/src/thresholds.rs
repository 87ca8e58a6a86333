//! Threshold tables and condition classification.
//!
//! Each channel has a [`ThresholdTable`]: ascending cut points splitting the
//! value axis into labelled bands. Classification is a pure lookup.
//!
//! # Example
//!
//! ```
//! use ecosense_core::Thresholds;
//! use ecosense_types::{Channel, ConditionBand};
//!
//! let thresholds = Thresholds::default();
//! assert_eq!(thresholds.classify_value(Channel::Co2, 800.0), ConditionBand::Good);
//! // A value on a cut point takes the better-graded neighbour.
//! assert_eq!(thresholds.classify_value(Channel::Co2, 600.0), ConditionBand::Excellent);
//! assert_eq!(thresholds.classify_value(Channel::Temperature, 24.0), ConditionBand::Comfortable);
//! ```

use serde::{Deserialize, Serialize};

use ecosense_types::ConditionBand::{
    Adequate, Bright, Busy, Cold, Comfortable, Crowded, Damp, Dim, Dry, Excellent, Excessive,
    Good, Hot, Humid, Low, Moderate, Poor, Vacant, Warm,
};
use ecosense_types::{Channel, ChannelStats, ConditionBand};

use crate::error::{Error, Result};

/// Cut points and band labels for one channel.
///
/// `bands[0]` covers values below `cuts[0]`, `bands[i]` covers
/// `cuts[i-1]..cuts[i]` and the last band covers everything above the last
/// cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub cuts: Vec<f64>,
    pub bands: Vec<ConditionBand>,
}

/// Which direction of change counts as an improvement for a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Polarity {
    /// The best band is the lowest range.
    LowerIsBetter,
    /// The best band is the highest range.
    HigherIsBetter,
    /// The best band is interior; closer to this value is better.
    Target(f64),
}

impl ThresholdTable {
    /// Create a validated table.
    pub fn new(cuts: Vec<f64>, bands: Vec<ConditionBand>) -> Result<Self> {
        let table = Self { cuts, bands };
        table.validate()?;
        Ok(table)
    }

    fn preset(cuts: [f64; 3], bands: [ConditionBand; 4]) -> Self {
        Self {
            cuts: cuts.to_vec(),
            bands: bands.to_vec(),
        }
    }

    /// Check the table's structural invariants.
    pub fn validate(&self) -> Result<()> {
        if self.bands.len() != self.cuts.len() + 1 {
            return Err(Error::InvalidConfig(format!(
                "threshold table has {} cuts but {} bands (expected {})",
                self.cuts.len(),
                self.bands.len(),
                self.cuts.len() + 1
            )));
        }
        if self.cuts.iter().any(|c| !c.is_finite()) {
            return Err(Error::InvalidConfig(
                "threshold cuts must be finite numbers".to_string(),
            ));
        }
        if self.cuts.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidConfig(format!(
                "threshold cuts must be strictly ascending: {:?}",
                self.cuts
            )));
        }
        if self.bands.contains(&ConditionBand::Unknown) {
            return Err(Error::InvalidConfig(
                "'unknown' cannot be used as a threshold band".to_string(),
            ));
        }
        Ok(())
    }

    /// Band for a single value.
    ///
    /// A value exactly on a cut resolves to the better-graded of the two
    /// adjacent bands, or the lower one when their grades are equal.
    /// Non-finite values are [`ConditionBand::Unknown`].
    #[must_use]
    pub fn classify(&self, value: f64) -> ConditionBand {
        if !value.is_finite() {
            return ConditionBand::Unknown;
        }
        let i = self.cuts.partition_point(|&c| c < value);
        let Some(&band) = self.bands.get(i) else {
            return ConditionBand::Unknown;
        };
        if self.cuts.get(i) == Some(&value)
            && let Some(&upper) = self.bands.get(i + 1)
            && upper.grade() < band.grade()
        {
            return upper;
        }
        band
    }

    /// Index of the best-graded band (first one on ties).
    #[must_use]
    pub fn best_band_index(&self) -> usize {
        self.bands
            .iter()
            .enumerate()
            .min_by_key(|(_, b)| b.grade())
            .map_or(0, |(i, _)| i)
    }

    /// Improvement direction implied by where the best band sits.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        let best = self.best_band_index();
        if best == 0 {
            Polarity::LowerIsBetter
        } else if best + 1 == self.bands.len() {
            Polarity::HigherIsBetter
        } else {
            Polarity::Target((self.cuts[best - 1] + self.cuts[best]) / 2.0)
        }
    }
}

/// Threshold tables for every channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// CO2 ppm.
    pub co2: ThresholdTable,
    /// Temperature °C.
    pub temperature: ThresholdTable,
    /// Relative humidity %.
    pub humidity: ThresholdTable,
    /// Illuminance lux.
    pub light: ThresholdTable,
    /// Share of readings with motion detected.
    pub motion: ThresholdTable,
}

const CO2_BANDS: [ConditionBand; 4] = [Excellent, Good, Moderate, Poor];
const TEMPERATURE_BANDS: [ConditionBand; 4] = [Cold, Comfortable, Warm, Hot];
const HUMIDITY_BANDS: [ConditionBand; 4] = [Dry, Comfortable, Humid, Damp];
const LIGHT_BANDS: [ConditionBand; 4] = [Dim, Adequate, Bright, Excessive];
const MOTION_BANDS: [ConditionBand; 4] = [Vacant, Low, Busy, Crowded];

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            co2: ThresholdTable::preset([600.0, 1000.0, 1500.0], CO2_BANDS),
            temperature: ThresholdTable::preset([21.0, 24.0, 27.0], TEMPERATURE_BANDS),
            humidity: ThresholdTable::preset([40.0, 60.0, 70.0], HUMIDITY_BANDS),
            light: ThresholdTable::preset([100.0, 500.0, 1000.0], LIGHT_BANDS),
            motion: ThresholdTable::preset([0.1, 0.4, 0.7], MOTION_BANDS),
        }
    }
}

impl ThresholdConfig {
    /// Tighter limits for sensitive spaces (classrooms, healthcare).
    pub fn strict() -> Self {
        Self {
            co2: ThresholdTable::preset([450.0, 800.0, 1200.0], CO2_BANDS),
            temperature: ThresholdTable::preset([20.5, 23.5, 26.0], TEMPERATURE_BANDS),
            humidity: ThresholdTable::preset([40.0, 55.0, 65.0], HUMIDITY_BANDS),
            light: ThresholdTable::preset([200.0, 500.0, 800.0], LIGHT_BANDS),
            motion: ThresholdTable::preset([0.1, 0.35, 0.6], MOTION_BANDS),
        }
    }

    /// Looser limits for warehouses and industrial spaces.
    pub fn relaxed() -> Self {
        Self {
            co2: ThresholdTable::preset([800.0, 1200.0, 2000.0], CO2_BANDS),
            temperature: ThresholdTable::preset([19.0, 25.0, 28.0], TEMPERATURE_BANDS),
            humidity: ThresholdTable::preset([30.0, 65.0, 75.0], HUMIDITY_BANDS),
            light: ThresholdTable::preset([50.0, 500.0, 1500.0], LIGHT_BANDS),
            motion: ThresholdTable::preset([0.05, 0.5, 0.85], MOTION_BANDS),
        }
    }

    /// Table for a channel.
    pub fn table(&self, channel: Channel) -> &ThresholdTable {
        match channel {
            Channel::Co2 => &self.co2,
            Channel::Temperature => &self.temperature,
            Channel::Humidity => &self.humidity,
            Channel::Light => &self.light,
            Channel::Motion => &self.motion,
        }
    }

    /// Validate every table.
    pub fn validate(&self) -> Result<()> {
        for channel in Channel::ALL {
            self.table(channel).validate().map_err(|e| match e {
                Error::InvalidConfig(msg) => Error::InvalidConfig(format!("{channel}: {msg}")),
                other => other,
            })?;
        }
        Ok(())
    }
}

/// Threshold evaluator for channel statistics.
#[derive(Debug, Clone, Default)]
pub struct Thresholds {
    config: ThresholdConfig,
}

impl Thresholds {
    /// Create a new threshold evaluator with the given configuration.
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Create a threshold evaluator with strict thresholds.
    pub fn strict() -> Self {
        Self::new(ThresholdConfig::strict())
    }

    /// Create a threshold evaluator with relaxed thresholds.
    pub fn relaxed() -> Self {
        Self::new(ThresholdConfig::relaxed())
    }

    /// Get the configuration.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Classify a channel's aggregate. No mean means [`ConditionBand::Unknown`].
    pub fn classify(&self, channel: Channel, stats: &ChannelStats) -> ConditionBand {
        stats
            .mean
            .map_or(ConditionBand::Unknown, |mean| self.classify_value(channel, mean))
    }

    /// Classify a single value.
    pub fn classify_value(&self, channel: Channel, value: f64) -> ConditionBand {
        self.config.table(channel).classify(value)
    }

    /// Improvement direction for a channel.
    pub fn polarity(&self, channel: Channel) -> Polarity {
        self.config.table(channel).polarity()
    }
}
