//! Core types for building sensor data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// A sensor measurement type.
///
/// Variants are declared in reporting priority order: air quality first,
/// then thermal comfort, occupancy and lighting. `Ord` follows that order,
/// so ordered maps keyed by `Channel` iterate by priority.
///
/// ```
/// use ecosense_types::Channel;
///
/// assert!(Channel::Co2 < Channel::Temperature);
/// assert!(Channel::Motion < Channel::Light);
/// assert_eq!("pir".parse::<Channel>(), Ok(Channel::Motion));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Channel {
    /// CO2 concentration in ppm.
    Co2,
    /// Air temperature in degrees Celsius.
    Temperature,
    /// Relative humidity percentage.
    Humidity,
    /// PIR motion detection (occupancy).
    Motion,
    /// Illuminance in lux.
    Light,
}

impl Channel {
    /// All channels in priority order.
    pub const ALL: [Channel; 5] = [
        Channel::Co2,
        Channel::Temperature,
        Channel::Humidity,
        Channel::Motion,
        Channel::Light,
    ];

    /// Stable lowercase identifier used in config keys and output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Co2 => "co2",
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Motion => "motion",
            Channel::Light => "light",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Co2 => "CO2",
            Channel::Temperature => "Temperature",
            Channel::Humidity => "Humidity",
            Channel::Motion => "Occupancy",
            Channel::Light => "Light",
        }
    }

    /// Measurement unit of the aggregated value.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Co2 => "ppm",
            Channel::Temperature => "°C",
            Channel::Humidity => "%",
            Channel::Motion => "rate",
            Channel::Light => "lux",
        }
    }

    /// Zero-based priority; lower values sort first in deficiency lists.
    #[must_use]
    pub fn priority(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "co2" | "co2_ppm" | "air" | "air_quality" => Ok(Channel::Co2),
            "temperature" | "temperature_c" | "temp" => Ok(Channel::Temperature),
            "humidity" | "humidity_pct" => Ok(Channel::Humidity),
            "motion" | "motion_detected" | "pir" | "occupancy" => Ok(Channel::Motion),
            "light" | "light_lux" | "lux" | "lighting" => Ok(Channel::Light),
            _ => Err(ParseError::UnknownChannel(s.to_string())),
        }
    }
}

/// One sensor sample.
///
/// Every measurement is optional; a missing value is a gap in the data, not
/// a zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// When the sample was taken (UTC).
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Building the sensor belongs to.
    pub building_id: String,
    /// CO2 concentration in ppm.
    pub co2_ppm: Option<f64>,
    /// Temperature in degrees Celsius.
    pub temperature_c: Option<f64>,
    /// Relative humidity percentage.
    pub humidity_pct: Option<f64>,
    /// Illuminance in lux.
    pub light_lux: Option<f64>,
    /// Motion detected by the PIR sensor; `None` when unknown.
    pub motion_detected: Option<bool>,
}

impl Reading {
    /// Create a reading with no measurements.
    pub fn new(timestamp: OffsetDateTime, building_id: impl Into<String>) -> Self {
        Self {
            timestamp,
            building_id: building_id.into(),
            co2_ppm: None,
            temperature_c: None,
            humidity_pct: None,
            light_lux: None,
            motion_detected: None,
        }
    }

    /// Numeric value of a channel, if present. Motion maps to `1.0`/`0.0`.
    #[must_use]
    pub fn value(&self, channel: Channel) -> Option<f64> {
        match channel {
            Channel::Co2 => self.co2_ppm,
            Channel::Temperature => self.temperature_c,
            Channel::Humidity => self.humidity_pct,
            Channel::Light => self.light_lux,
            Channel::Motion => self.motion_detected.map(|m| if m { 1.0 } else { 0.0 }),
        }
    }
}

/// Descriptive statistics for one channel over a window.
///
/// `mean`, `min`, `max`, `median` and `std_dev` are `None` when the channel has no
/// samples; they are never defaulted to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelStats {
    /// Arithmetic mean of present values.
    pub mean: Option<f64>,
    /// Smallest present value.
    pub min: Option<f64>,
    /// Largest present value.
    pub max: Option<f64>,
    /// Middle present value, or the mean of the two middle values.
    pub median: Option<f64>,
    /// Sample standard deviation (needs at least two samples).
    pub std_dev: Option<f64>,
    /// Readings in the window where the field is present.
    pub sample_count: usize,
    /// Readings in the window where the field is absent.
    pub missing_count: usize,
}

impl ChannelStats {
    /// Stats for a side of a comparison that has no readings at all.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Whether at least one sample was present.
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.sample_count > 0
    }

    /// Number of readings the stats were computed over.
    #[must_use]
    pub fn reading_count(&self) -> usize {
        self.sample_count + self.missing_count
    }

    /// Fraction of readings where the field was present.
    ///
    /// Returns `None` when the window held no readings.
    ///
    /// ```
    /// use ecosense_types::ChannelStats;
    ///
    /// let stats = ChannelStats { sample_count: 3, missing_count: 1, ..Default::default() };
    /// assert_eq!(stats.completeness(), Some(0.75));
    /// assert_eq!(ChannelStats::unavailable().completeness(), None);
    /// ```
    #[must_use]
    pub fn completeness(&self) -> Option<f64> {
        let total = self.reading_count();
        if total == 0 {
            None
        } else {
            Some(self.sample_count as f64 / total as f64)
        }
    }
}

/// Severity tier of a condition band.
///
/// Ordered from best to worst: `Excellent < Good < Moderate < Poor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Grade {
    /// No concern.
    Excellent,
    /// Acceptable.
    Good,
    /// Needs attention.
    Moderate,
    /// Needs action.
    Poor,
}

impl Grade {
    /// All grades from best to worst.
    pub const ALL: [Grade; 4] = [Grade::Excellent, Grade::Good, Grade::Moderate, Grade::Poor];
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Excellent => write!(f, "excellent"),
            Grade::Good => write!(f, "good"),
            Grade::Moderate => write!(f, "moderate"),
            Grade::Poor => write!(f, "poor"),
        }
    }
}

/// Qualitative classification of a channel's aggregated value.
///
/// Each channel uses its own subset of labels (see the threshold tables in
/// `ecosense-core`). Every label except [`ConditionBand::Unknown`] carries an
/// intrinsic [`Grade`].
///
/// ```
/// use ecosense_types::{ConditionBand, Grade};
///
/// assert_eq!(ConditionBand::Comfortable.grade(), Some(Grade::Excellent));
/// assert_eq!(ConditionBand::Hot.grade(), Some(Grade::Poor));
/// assert_eq!(ConditionBand::Unknown.grade(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConditionBand {
    // Air quality
    Excellent,
    Good,
    Moderate,
    Poor,
    // Thermal comfort and humidity
    Cold,
    Comfortable,
    Warm,
    Hot,
    Dry,
    Humid,
    Damp,
    // Lighting
    Dim,
    Adequate,
    Bright,
    Excessive,
    // Occupancy
    Vacant,
    Low,
    Busy,
    Crowded,
    /// Not enough samples to classify.
    Unknown,
}

impl ConditionBand {
    /// Severity tier, or `None` for [`ConditionBand::Unknown`].
    #[must_use]
    pub fn grade(&self) -> Option<Grade> {
        use ConditionBand::*;
        match self {
            Excellent | Comfortable | Adequate | Low => Some(Grade::Excellent),
            Good | Bright | Vacant | Busy => Some(Grade::Good),
            Moderate | Cold | Warm | Dry | Humid | Dim | Crowded => Some(Grade::Moderate),
            Poor | Hot | Damp | Excessive => Some(Grade::Poor),
            Unknown => None,
        }
    }

    /// Whether the band is worse than [`Grade::Good`].
    #[must_use]
    pub fn is_deficient(&self) -> bool {
        self.grade().is_some_and(|g| g > Grade::Good)
    }

    /// Stable lowercase identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        use ConditionBand::*;
        match self {
            Excellent => "excellent",
            Good => "good",
            Moderate => "moderate",
            Poor => "poor",
            Cold => "cold",
            Comfortable => "comfortable",
            Warm => "warm",
            Hot => "hot",
            Dry => "dry",
            Humid => "humid",
            Damp => "damp",
            Dim => "dim",
            Adequate => "adequate",
            Bright => "bright",
            Excessive => "excessive",
            Vacant => "vacant",
            Low => "low",
            Busy => "busy",
            Crowded => "crowded",
            Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConditionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConditionBand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ConditionBand::*;
        let band = match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Excellent,
            "good" => Good,
            "moderate" => Moderate,
            "poor" => Poor,
            "cold" => Cold,
            "comfortable" => Comfortable,
            "warm" => Warm,
            "hot" => Hot,
            "dry" => Dry,
            "humid" => Humid,
            "damp" => Damp,
            "dim" => Dim,
            "adequate" => Adequate,
            "bright" => Bright,
            "excessive" => Excessive,
            "vacant" => Vacant,
            "low" => Low,
            "busy" => Busy,
            "crowded" => Crowded,
            "unknown" => Unknown,
            _ => return Err(ParseError::UnknownBand(s.to_string())),
        };
        Ok(band)
    }
}

/// Direction of change between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Trend {
    /// Moved toward better conditions.
    Improving,
    /// Moved toward worse conditions.
    Worsening,
    /// Change within the dead-band.
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Improving => write!(f, "improving"),
            Trend::Worsening => write!(f, "worsening"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}
