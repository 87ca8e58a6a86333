//! Sustainability report synthesis.
//!
//! A report runs the full pipeline for one window: slice, aggregate,
//! classify, score and recommend. With a baseline window both sides run the
//! pipeline independently and the report carries per-channel deltas and
//! trends.
//!
//! # Example
//!
//! ```
//! use ecosense_core::{RawRecord, ReportSynthesizer, SensorDataset};
//! use ecosense_types::TimeWindow;
//!
//! let (dataset, _) = SensorDataset::load(vec![
//!     RawRecord::new("2024-01-01 09:00:00", "413").co2("500").temperature("22"),
//!     RawRecord::new("2024-01-01 10:00:00", "413").co2("1200").temperature("23"),
//!     RawRecord::new("2024-01-01 11:00:00", "413").co2("1600").temperature("22.5"),
//! ]);
//!
//! let synthesizer = ReportSynthesizer::default();
//! let report = synthesizer
//!     .build_report(&dataset, &TimeWindow::unbounded(), None)
//!     .unwrap();
//! assert!(report.score.is_some());
//! assert_eq!(report.summary.reading_count, 3);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use ecosense_types::{Channel, ChannelStats, ConditionBand, Reading, TimeWindow, Trend};

use crate::aggregate::{
    BandShare, ComfortSummary, OccupancyProfile, aggregate_readings, band_distribution,
    comfort_summary, occupancy_profile,
};
use crate::config::AnalysisConfig;
use crate::dataset::SensorDataset;
use crate::error::{Error, Result};
use crate::recommend::{Recommendation, RecommendationCatalog};
use crate::scoring::{Deficiency, Scorer};
use crate::thresholds::{Polarity, Thresholds};

/// Data quality issue attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum DataWarning {
    /// The channel had no samples in the window and was classified unknown.
    InsufficientData { channel: Channel },
    /// The channel was present in fewer readings than the configured ratio.
    LowCompleteness { channel: Channel, completeness: f64 },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::InsufficientData { channel } => {
                write!(f, "No {} data in this window", channel.label())
            }
            DataWarning::LowCompleteness {
                channel,
                completeness,
            } => write!(
                f,
                "{} data is only {:.0}% complete",
                channel.label(),
                completeness * 100.0
            ),
        }
    }
}

/// What the report was computed over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub building_id: Option<String>,
    pub reading_count: usize,
    #[serde(with = "time::serde::rfc3339::option")]
    pub first_reading: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_reading: Option<OffsetDateTime>,
}

/// Change in a channel's mean between the baseline and the current window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelDelta {
    pub current_mean: Option<f64>,
    pub baseline_mean: Option<f64>,
    /// `current - baseline`.
    pub delta: Option<f64>,
    /// Delta relative to the baseline, in percent. Undefined for a zero baseline.
    pub percent_change: Option<f64>,
    pub trend: Option<Trend>,
}

/// Scored, recommendation-bearing analysis of one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SustainabilityReport {
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub window: TimeWindow,
    pub summary: ReportSummary,
    /// 0-100; `None` for the empty side of a partial comparison.
    pub score: Option<u8>,
    pub channel_stats: BTreeMap<Channel, ChannelStats>,
    pub bands: BTreeMap<Channel, ConditionBand>,
    pub deficiencies: Vec<Deficiency>,
    pub recommendations: Vec<Recommendation>,
    pub warnings: Vec<DataWarning>,
    pub distribution: BTreeMap<Channel, Vec<BandShare>>,
    pub occupancy: Option<OccupancyProfile>,
    pub comfort: Option<ComfortSummary>,
    /// Baseline report when this is a comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Box<SustainabilityReport>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub deltas: BTreeMap<Channel, ChannelDelta>,
    /// One side of the comparison had no readings.
    pub comparison_partial: bool,
}

impl SustainabilityReport {
    /// Whether the report was computed from at least one reading.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.score.is_some()
    }

    fn unavailable(window: TimeWindow, generated_at: OffsetDateTime) -> Self {
        Self {
            generated_at,
            window,
            summary: ReportSummary {
                building_id: None,
                reading_count: 0,
                first_reading: None,
                last_reading: None,
            },
            score: None,
            channel_stats: Channel::ALL
                .into_iter()
                .map(|c| (c, ChannelStats::unavailable()))
                .collect(),
            bands: Channel::ALL
                .into_iter()
                .map(|c| (c, ConditionBand::Unknown))
                .collect(),
            deficiencies: Vec::new(),
            recommendations: Vec::new(),
            warnings: Vec::new(),
            distribution: BTreeMap::new(),
            occupancy: None,
            comfort: None,
            comparison: None,
            deltas: BTreeMap::new(),
            comparison_partial: false,
        }
    }
}

/// Builds [`SustainabilityReport`]s. Holds only configuration, so one
/// instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct ReportSynthesizer {
    config: AnalysisConfig,
    thresholds: Thresholds,
    scorer: Scorer,
    catalog: RecommendationCatalog,
}

impl Default for ReportSynthesizer {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            thresholds: Thresholds::default(),
            scorer: Scorer::default(),
            catalog: RecommendationCatalog::default(),
        }
    }
}

impl ReportSynthesizer {
    /// Create a synthesizer from a validated configuration.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let catalog = RecommendationCatalog::with_overrides(&config.recommendations)?;
        Ok(Self {
            thresholds: Thresholds::new(config.thresholds.clone()),
            scorer: Scorer::new(config.penalties.clone()),
            catalog,
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Build a report for `window`, optionally compared against `baseline`.
    ///
    /// Without a baseline an empty window is [`Error::EmptyWindow`]. With a
    /// baseline, one empty side yields a partial comparison and only two
    /// empty sides are an error.
    pub fn build_report(
        &self,
        dataset: &SensorDataset,
        window: &TimeWindow,
        baseline: Option<&TimeWindow>,
    ) -> Result<SustainabilityReport> {
        let generated_at = OffsetDateTime::now_utc();

        let Some(baseline) = baseline else {
            let readings = dataset.slice(window)?;
            let report = self.analyze(*window, readings, generated_at);
            info!(
                "Built report for {} ({} readings, score {:?})",
                window, report.summary.reading_count, report.score
            );
            return Ok(report);
        };

        let current_readings = dataset.readings_in(window);
        let baseline_readings = dataset.readings_in(baseline);
        if current_readings.is_empty() && baseline_readings.is_empty() {
            return Err(Error::EmptyWindow(*window));
        }

        let side = |w: &TimeWindow, readings: &[Reading]| {
            if readings.is_empty() {
                warn!("No readings in {}, comparison will be partial", w);
                SustainabilityReport::unavailable(*w, generated_at)
            } else {
                self.analyze(*w, readings, generated_at)
            }
        };
        let mut current = side(window, current_readings);
        let previous = side(baseline, baseline_readings);

        current.deltas = Channel::ALL
            .into_iter()
            .map(|c| (c, self.delta(c, &current, &previous)))
            .collect();
        current.comparison_partial = current_readings.is_empty() || baseline_readings.is_empty();
        current.comparison = Some(Box::new(previous));
        info!(
            "Built comparison report for {} against {}{}",
            window,
            baseline,
            if current.comparison_partial {
                " (partial)"
            } else {
                ""
            }
        );
        Ok(current)
    }

    fn analyze(
        &self,
        window: TimeWindow,
        readings: &[Reading],
        generated_at: OffsetDateTime,
    ) -> SustainabilityReport {
        let channel_stats = aggregate_readings(readings, &Channel::ALL);
        let bands: BTreeMap<Channel, ConditionBand> = channel_stats
            .iter()
            .map(|(&c, stats)| (c, self.thresholds.classify(c, stats)))
            .collect();
        debug!("Classified {:?}", bands);

        let mut warnings = Vec::new();
        for (&channel, stats) in &channel_stats {
            if !stats.has_data() {
                warn!("No {} samples in {}", channel, window);
                warnings.push(DataWarning::InsufficientData { channel });
            } else if let Some(completeness) = stats.completeness()
                && completeness < self.config.completeness_warning
            {
                warnings.push(DataWarning::LowCompleteness {
                    channel,
                    completeness,
                });
            }
        }

        let card = self.scorer.score(&bands);
        let recommendations = self.catalog.recommend(&card.deficiencies);

        SustainabilityReport {
            generated_at,
            window,
            summary: ReportSummary {
                building_id: readings.first().map(|r| r.building_id.clone()),
                reading_count: readings.len(),
                first_reading: readings.first().map(|r| r.timestamp),
                last_reading: readings.last().map(|r| r.timestamp),
            },
            score: Some(card.score),
            channel_stats,
            bands,
            deficiencies: card.deficiencies,
            recommendations,
            warnings,
            distribution: band_distribution(readings, &self.thresholds),
            occupancy: occupancy_profile(readings),
            comfort: comfort_summary(readings, &self.thresholds),
            comparison: None,
            deltas: BTreeMap::new(),
            comparison_partial: false,
        }
    }

    fn delta(
        &self,
        channel: Channel,
        current: &SustainabilityReport,
        baseline: &SustainabilityReport,
    ) -> ChannelDelta {
        let current_mean = current.channel_stats.get(&channel).and_then(|s| s.mean);
        let baseline_mean = baseline.channel_stats.get(&channel).and_then(|s| s.mean);
        let (Some(c), Some(b)) = (current_mean, baseline_mean) else {
            return ChannelDelta {
                current_mean,
                baseline_mean,
                delta: None,
                percent_change: None,
                trend: None,
            };
        };
        let delta = c - b;
        ChannelDelta {
            current_mean,
            baseline_mean,
            delta: Some(delta),
            percent_change: (b != 0.0).then(|| delta / b.abs() * 100.0),
            trend: Some(self.trend(channel, c, b)),
        }
    }

    /// Direction of change from `baseline` to `current` for a channel.
    ///
    /// For a target channel, a move to the same distance on the other side
    /// of the target is decided by the band grades of the two means and is
    /// `Stable` only when those grades match.
    pub fn trend(&self, channel: Channel, current: f64, baseline: f64) -> Trend {
        let delta = current - baseline;
        if delta.abs() <= self.config.trend_dead_band * baseline.abs() {
            return Trend::Stable;
        }
        match self.thresholds.polarity(channel) {
            Polarity::LowerIsBetter if delta < 0.0 => Trend::Improving,
            Polarity::LowerIsBetter => Trend::Worsening,
            Polarity::HigherIsBetter if delta > 0.0 => Trend::Improving,
            Polarity::HigherIsBetter => Trend::Worsening,
            Polarity::Target(target) => {
                let now = (current - target).abs();
                let before = (baseline - target).abs();
                if now < before {
                    return Trend::Improving;
                } else if now > before {
                    return Trend::Worsening;
                }
                let now = self.thresholds.classify_value(channel, current).grade();
                let before = self.thresholds.classify_value(channel, baseline).grade();
                match now.cmp(&before) {
                    Ordering::Less => Trend::Improving,
                    Ordering::Greater => Trend::Worsening,
                    Ordering::Equal => Trend::Stable,
                }
            }
        }
    }
}
