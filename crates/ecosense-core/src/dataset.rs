//! In-memory sensor dataset with load-time validation and windowed slicing.
//!
//! A [`SensorDataset`] is built once from raw rows and never mutated
//! afterwards. Every analysis call takes it by shared reference, so one
//! dataset can serve concurrent requests.
//!
//! # Example
//!
//! ```
//! use ecosense_core::{RawRecord, SensorDataset};
//! use ecosense_types::TimeWindow;
//!
//! let rows = vec![
//!     RawRecord::new("2024-01-01 09:00:00", "413").co2("640"),
//!     RawRecord::new("2024-01-01 10:00:00", "413").co2("NaN"),
//!     RawRecord::new("not a date", "413"),
//! ];
//! let (dataset, report) = SensorDataset::load(rows);
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(report.malformed.len(), 1);
//!
//! let window = TimeWindow::parse(Some("2024-01-01"), Some("2024-01-01")).unwrap();
//! assert_eq!(dataset.slice(&window).unwrap().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use ecosense_types::{Channel, ChannelStats, Reading, TimeWindow, parse_timestamp};

use crate::aggregate::aggregate_readings;
use crate::error::{Error, MalformedReason, MalformedRecord, Result};

/// Field values treated as "no data".
const NULL_SENTINELS: &[&str] = &["", "nan", "null", "na", "n/a", "none", "-"];

/// One unparsed input row.
///
/// Field names follow the sensor export; the aliases cover the column names
/// used by other exports of the same data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(alias = "datetime")]
    pub timestamp: Option<String>,
    pub building_id: Option<String>,
    #[serde(alias = "co2_ppm")]
    pub co2: Option<String>,
    #[serde(alias = "temperature_c")]
    pub temperature: Option<String>,
    #[serde(alias = "humidity_pct")]
    pub humidity: Option<String>,
    #[serde(alias = "light_lux")]
    pub light: Option<String>,
    #[serde(alias = "motion", alias = "motion_detected")]
    pub pir: Option<String>,
}

impl RawRecord {
    /// Row with a timestamp and building id and no measurements.
    pub fn new(timestamp: impl Into<String>, building_id: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            building_id: Some(building_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn co2(mut self, value: impl Into<String>) -> Self {
        self.co2 = Some(value.into());
        self
    }

    #[must_use]
    pub fn temperature(mut self, value: impl Into<String>) -> Self {
        self.temperature = Some(value.into());
        self
    }

    #[must_use]
    pub fn humidity(mut self, value: impl Into<String>) -> Self {
        self.humidity = Some(value.into());
        self
    }

    #[must_use]
    pub fn light(mut self, value: impl Into<String>) -> Self {
        self.light = Some(value.into());
        self
    }

    #[must_use]
    pub fn pir(mut self, value: impl Into<String>) -> Self {
        self.pir = Some(value.into());
        self
    }

    fn field(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Co2 => self.co2.as_deref(),
            Channel::Temperature => self.temperature.as_deref(),
            Channel::Humidity => self.humidity.as_deref(),
            Channel::Light => self.light.as_deref(),
            Channel::Motion => self.pir.as_deref(),
        }
    }
}

/// Physically plausible value ranges; anything outside is treated as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlausibleRanges {
    pub co2: RangeInclusive<f64>,
    pub temperature: RangeInclusive<f64>,
    pub humidity: RangeInclusive<f64>,
    pub light: RangeInclusive<f64>,
}

impl Default for PlausibleRanges {
    fn default() -> Self {
        Self {
            co2: 0.0..=10_000.0,
            temperature: -40.0..=85.0,
            humidity: 0.0..=100.0,
            light: 0.0..=200_000.0,
        }
    }
}

impl PlausibleRanges {
    /// Whether `value` is a finite number inside the channel's range.
    ///
    /// Motion values are booleans and always plausible.
    #[must_use]
    pub fn contains(&self, channel: Channel, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match channel {
            Channel::Co2 => self.co2.contains(&value),
            Channel::Temperature => self.temperature.contains(&value),
            Channel::Humidity => self.humidity.contains(&value),
            Channel::Light => self.light.contains(&value),
            Channel::Motion => true,
        }
    }
}

/// Present/missing counters for one field across the whole dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldCompleteness {
    pub present: usize,
    pub missing: usize,
}

impl FieldCompleteness {
    /// Share of readings where the field is present.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        let total = self.present + self.missing;
        (total > 0).then(|| self.present as f64 / total as f64)
    }
}

/// What happened while loading rows into a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Rows seen, including malformed ones.
    pub total_rows: usize,
    /// Rows that became readings.
    pub accepted: usize,
    /// Rows that were skipped.
    pub malformed: Vec<MalformedRecord>,
    /// Whether timestamps arrived out of order and had to be sorted.
    pub out_of_order: bool,
    /// Field values outside the plausible range (recorded as missing).
    pub out_of_range: BTreeMap<Channel, usize>,
    /// Field values that were not numbers or null markers (recorded as missing).
    pub unparsable: BTreeMap<Channel, usize>,
}

impl LoadReport {
    /// Whether every row was accepted with every present value usable.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty() && self.out_of_range.is_empty() && self.unparsable.is_empty()
    }
}

/// Outcome of parsing a single measurement field.
enum Field<T> {
    Missing,
    Unparsable,
    OutOfRange,
    Value(T),
}

fn is_null(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    NULL_SENTINELS.contains(&lowered.as_str())
}

fn parse_number(raw: Option<&str>, channel: Channel, ranges: &PlausibleRanges) -> Field<f64> {
    let Some(raw) = raw else {
        return Field::Missing;
    };
    if is_null(raw) {
        return Field::Missing;
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if ranges.contains(channel, v) => Field::Value(v),
        Ok(_) => Field::OutOfRange,
        Err(_) => Field::Unparsable,
    }
}

fn parse_motion(raw: Option<&str>) -> Field<bool> {
    let Some(raw) = raw else {
        return Field::Missing;
    };
    if is_null(raw) {
        return Field::Missing;
    }
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Field::Value(true),
        "0" | "0.0" | "false" | "no" => Field::Value(false),
        _ => Field::Unparsable,
    }
}

/// Incremental dataset construction used by [`SensorDataset::load`] and the
/// CSV source.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    ranges: PlausibleRanges,
    building_id: Option<String>,
    readings: Vec<Reading>,
    report: LoadReport,
}

impl DatasetBuilder {
    /// Builder using the default plausible ranges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder using custom plausible ranges.
    pub fn with_ranges(ranges: PlausibleRanges) -> Self {
        Self {
            ranges,
            ..Self::default()
        }
    }

    /// Validate and add one row. `row` is the one-based data row number.
    pub fn push(&mut self, row: usize, raw: RawRecord) {
        self.report.total_rows += 1;
        match self.convert(&raw) {
            Ok(reading) => {
                if self
                    .readings
                    .last()
                    .is_some_and(|last| reading.timestamp < last.timestamp)
                {
                    self.report.out_of_order = true;
                }
                self.readings.push(reading);
                self.report.accepted += 1;
            }
            Err(reason) => self.skip(row, reason),
        }
    }

    /// Record a row that could not be decoded at all.
    pub fn reject(&mut self, row: usize, reason: MalformedReason) {
        self.report.total_rows += 1;
        self.skip(row, reason);
    }

    fn skip(&mut self, row: usize, reason: MalformedReason) {
        warn!("Skipping row {}: {}", row, reason);
        self.report.malformed.push(MalformedRecord { row, reason });
    }

    fn convert(&mut self, raw: &RawRecord) -> std::result::Result<Reading, MalformedReason> {
        let ts_raw = raw
            .timestamp
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(MalformedReason::MissingTimestamp)?;
        let timestamp =
            parse_timestamp(ts_raw).map_err(|_| MalformedReason::InvalidTimestamp {
                value: ts_raw.to_string(),
            })?;

        let building_id = raw
            .building_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(MalformedReason::MissingBuildingId)?;
        match &self.building_id {
            Some(expected) if expected != building_id => {
                return Err(MalformedReason::ForeignBuilding {
                    expected: expected.clone(),
                    found: building_id.to_string(),
                });
            }
            Some(_) => {}
            None => self.building_id = Some(building_id.to_string()),
        }

        let mut reading = Reading::new(timestamp, building_id);
        for channel in [
            Channel::Co2,
            Channel::Temperature,
            Channel::Humidity,
            Channel::Light,
        ] {
            let value = match parse_number(raw.field(channel), channel, &self.ranges) {
                Field::Value(v) => Some(v),
                Field::Missing => None,
                Field::OutOfRange => {
                    *self.report.out_of_range.entry(channel).or_default() += 1;
                    None
                }
                Field::Unparsable => {
                    *self.report.unparsable.entry(channel).or_default() += 1;
                    None
                }
            };
            match channel {
                Channel::Co2 => reading.co2_ppm = value,
                Channel::Temperature => reading.temperature_c = value,
                Channel::Humidity => reading.humidity_pct = value,
                Channel::Light => reading.light_lux = value,
                Channel::Motion => {}
            }
        }
        reading.motion_detected = match parse_motion(raw.field(Channel::Motion)) {
            Field::Value(m) => Some(m),
            Field::Unparsable => {
                *self.report.unparsable.entry(Channel::Motion).or_default() += 1;
                None
            }
            Field::Missing | Field::OutOfRange => None,
        };
        Ok(reading)
    }

    /// Sort the readings and freeze the dataset.
    pub fn finish(self) -> (SensorDataset, LoadReport) {
        let Self {
            building_id,
            mut readings,
            report,
            ..
        } = self;

        if report.out_of_order {
            debug!("Input was out of order, sorting {} readings", readings.len());
            readings.sort_by_key(|r| r.timestamp);
        }

        let mut completeness = BTreeMap::new();
        for channel in Channel::ALL {
            let present = readings
                .iter()
                .filter(|r| r.value(channel).is_some())
                .count();
            completeness.insert(
                channel,
                FieldCompleteness {
                    present,
                    missing: readings.len() - present,
                },
            );
        }

        info!(
            "Loaded {} readings ({} rows skipped)",
            report.accepted,
            report.malformed.len()
        );
        for (channel, count) in &report.out_of_range {
            warn!("{} {} values outside the plausible range were dropped", count, channel);
        }

        let dataset = SensorDataset {
            building_id,
            readings,
            completeness,
        };
        (dataset, report)
    }
}

/// Immutable, timestamp-ordered readings for one building.
#[derive(Debug, Clone, Default)]
pub struct SensorDataset {
    building_id: Option<String>,
    readings: Vec<Reading>,
    completeness: BTreeMap<Channel, FieldCompleteness>,
}

impl SensorDataset {
    /// Build a dataset from raw rows.
    ///
    /// Malformed rows are skipped and listed in the returned [`LoadReport`];
    /// loading itself never fails.
    pub fn load<I>(rows: I) -> (Self, LoadReport)
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut builder = DatasetBuilder::new();
        for (i, raw) in rows.into_iter().enumerate() {
            builder.push(i + 1, raw);
        }
        builder.finish()
    }

    /// Build a dataset directly from parsed readings.
    ///
    /// Readings from buildings other than the first one are dropped.
    pub fn from_readings(mut readings: Vec<Reading>) -> Self {
        let building_id = readings.first().map(|r| r.building_id.clone());
        if let Some(id) = &building_id {
            readings.retain(|r| &r.building_id == id);
        }
        readings.sort_by_key(|r| r.timestamp);
        let completeness = Channel::ALL
            .into_iter()
            .map(|channel| {
                let present = readings.iter().filter(|r| r.value(channel).is_some()).count();
                let missing = readings.len() - present;
                (channel, FieldCompleteness { present, missing })
            })
            .collect();
        Self {
            building_id,
            readings,
            completeness,
        }
    }

    /// Building the readings belong to; `None` for an empty dataset.
    pub fn building_id(&self) -> Option<&str> {
        self.building_id.as_deref()
    }

    /// All readings in timestamp order.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Timestamp of the first reading.
    pub fn first_timestamp(&self) -> Option<OffsetDateTime> {
        self.readings.first().map(|r| r.timestamp)
    }

    /// Timestamp of the last reading.
    pub fn last_timestamp(&self) -> Option<OffsetDateTime> {
        self.readings.last().map(|r| r.timestamp)
    }

    /// Present/missing counters for a field over the whole dataset.
    pub fn completeness(&self, channel: Channel) -> FieldCompleteness {
        self.completeness.get(&channel).copied().unwrap_or_default()
    }

    /// Readings with `start <= timestamp < end`, possibly empty.
    pub fn readings_in(&self, window: &TimeWindow) -> &[Reading] {
        let lo = window
            .start()
            .map_or(0, |s| self.readings.partition_point(|r| r.timestamp < s));
        let hi = window.end().map_or(self.readings.len(), |e| {
            self.readings.partition_point(|r| r.timestamp < e)
        });
        &self.readings[lo..hi.max(lo)]
    }

    /// Readings in the window.
    ///
    /// Returns [`Error::EmptyWindow`] when nothing falls inside it.
    pub fn slice(&self, window: &TimeWindow) -> Result<&[Reading]> {
        let slice = self.readings_in(window);
        debug!("Window {} selected {} readings", window, slice.len());
        if slice.is_empty() {
            return Err(Error::EmptyWindow(*window));
        }
        Ok(slice)
    }

    /// Overview of what the dataset holds.
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            building_id: self.building_id.clone(),
            total_records: self.readings.len(),
            first_reading: self.first_timestamp(),
            last_reading: self.last_timestamp(),
            channels: aggregate_readings(&self.readings, &Channel::ALL),
            motion_events: self
                .readings
                .iter()
                .filter(|r| r.motion_detected == Some(true))
                .count(),
        }
    }
}

/// Dataset overview: span, counts and full-span statistics per channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub building_id: Option<String>,
    pub total_records: usize,
    #[serde(with = "time::serde::rfc3339::option")]
    pub first_reading: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_reading: Option<OffsetDateTime>,
    pub channels: BTreeMap<Channel, ChannelStats>,
    pub motion_events: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn rows() -> Vec<RawRecord> {
        vec![
            RawRecord::new("2024-01-01 10:00:00", "413")
                .co2("700")
                .temperature("22.0")
                .pir("1"),
            RawRecord::new("2024-01-01 09:00:00", "413")
                .co2("650")
                .humidity("45")
                .pir("0"),
            RawRecord::new("2024-01-01 11:00:00", "413")
                .co2("NaN")
                .temperature("abc")
                .light("-5"),
        ]
    }

    #[test]
    fn test_load_sorts_and_reports_out_of_order() {
        let (ds, report) = SensorDataset::load(rows());
        assert!(report.out_of_order);
        assert_eq!(ds.len(), 3);
        let ts: Vec<_> = ds.readings().iter().map(|r| r.timestamp).collect();
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ds.first_timestamp(), Some(datetime!(2024-01-01 09:00:00 UTC)));
    }

    #[test]
    fn test_sentinels_and_garbage_are_missing_not_zero() {
        let (ds, report) = SensorDataset::load(rows());
        let last = &ds.readings()[2];
        assert_eq!(last.co2_ppm, None);
        assert_eq!(last.temperature_c, None);
        assert_eq!(last.light_lux, None);
        assert_eq!(report.unparsable.get(&Channel::Temperature), Some(&1));
        assert_eq!(report.out_of_range.get(&Channel::Light), Some(&1));
        assert_eq!(report.unparsable.get(&Channel::Co2), None);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_completeness_counters() {
        let (ds, _) = SensorDataset::load(rows());
        let co2 = ds.completeness(Channel::Co2);
        assert_eq!(co2, FieldCompleteness { present: 2, missing: 1 });
        let humidity = ds.completeness(Channel::Humidity);
        assert_eq!(humidity.present, 1);
        assert_eq!(ds.completeness(Channel::Motion).present, 2);
    }

    #[test]
    fn test_malformed_rows_are_skipped_and_counted() {
        let rows = vec![
            RawRecord::new("2024-01-01 09:00:00", "413").co2("600"),
            RawRecord::new("garbage", "413"),
            RawRecord {
                building_id: Some("413".into()),
                ..RawRecord::default()
            },
            RawRecord::new("2024-01-01 10:00:00", ""),
            RawRecord::new("2024-01-01 11:00:00", "999"),
        ];
        let (ds, report) = SensorDataset::load(rows);
        assert_eq!(ds.len(), 1);
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.accepted, 1);
        let reasons: Vec<_> = report.malformed.iter().map(|m| (m.row, &m.reason)).collect();
        assert_eq!(reasons[0].0, 2);
        assert!(matches!(reasons[0].1, MalformedReason::InvalidTimestamp { .. }));
        assert_eq!(reasons[1].1, &MalformedReason::MissingTimestamp);
        assert_eq!(reasons[2].1, &MalformedReason::MissingBuildingId);
        assert!(matches!(reasons[3].1, MalformedReason::ForeignBuilding { .. }));
    }

    #[test]
    fn test_motion_parsing() {
        for (raw, expected) in [
            ("1", Some(true)),
            ("1.0", Some(true)),
            ("TRUE", Some(true)),
            ("yes", Some(true)),
            ("0", Some(false)),
            ("0.0", Some(false)),
            ("no", Some(false)),
            ("maybe", None),
            ("", None),
        ] {
            let (ds, _) = SensorDataset::load(vec![RawRecord::new("2024-01-01", "1").pir(raw)]);
            assert_eq!(ds.readings()[0].motion_detected, expected, "input {raw:?}");
        }
    }

    #[test]
    fn test_infinite_values_are_out_of_range() {
        let (ds, report) =
            SensorDataset::load(vec![RawRecord::new("2024-01-01", "1").co2("inf")]);
        assert_eq!(ds.readings()[0].co2_ppm, None);
        assert_eq!(report.out_of_range.get(&Channel::Co2), Some(&1));
    }

    #[test]
    fn test_slice_is_half_open() {
        let (ds, _) = SensorDataset::load(rows());
        let window = TimeWindow::between(
            datetime!(2024-01-01 09:00:00 UTC),
            datetime!(2024-01-01 11:00:00 UTC),
        )
        .unwrap();
        let slice = ds.slice(&window).unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].timestamp, datetime!(2024-01-01 09:00:00 UTC));
    }

    #[test]
    fn test_slice_outside_data_is_empty_window() {
        let (ds, _) = SensorDataset::load(rows());
        let window = TimeWindow::parse(Some("2025-01-01"), None).unwrap();
        assert!(ds.readings_in(&window).is_empty());
        assert!(matches!(ds.slice(&window), Err(Error::EmptyWindow(_))));
    }

    #[test]
    fn test_unbounded_slice_is_everything() {
        let (ds, _) = SensorDataset::load(rows());
        assert_eq!(ds.slice(&TimeWindow::unbounded()).unwrap().len(), ds.len());
    }

    #[test]
    fn test_empty_dataset() {
        let (ds, report) = SensorDataset::load(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.building_id(), None);
        assert!(report.is_clean());
        assert!(ds.slice(&TimeWindow::unbounded()).is_err());
    }

    #[test]
    fn test_summary() {
        let (ds, _) = SensorDataset::load(rows());
        let summary = ds.summary();
        assert_eq!(summary.building_id.as_deref(), Some("413"));
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.motion_events, 1);
        let co2 = &summary.channels[&Channel::Co2];
        assert_eq!(co2.sample_count, 2);
        assert_eq!(co2.missing_count, 1);
        assert_eq!(co2.mean, Some(675.0));
    }

    #[test]
    fn test_from_readings_drops_other_buildings() {
        let a = Reading::new(datetime!(2024-01-01 10:00:00 UTC), "A");
        let b = Reading::new(datetime!(2024-01-01 09:00:00 UTC), "B");
        let ds = SensorDataset::from_readings(vec![a, b]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.building_id(), Some("A"));
    }
}
