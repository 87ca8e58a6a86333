//! Windowed statistics over sensor readings.
//!
//! Statistics are computed over present values only. A field that is absent
//! from a reading counts towards `missing_count` and never contributes a
//! default value.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Weekday;
use tracing::debug;

use ecosense_types::{Channel, ChannelStats, ConditionBand, Grade, Reading, TimeWindow};

use crate::dataset::SensorDataset;
use crate::error::Result;
use crate::thresholds::Thresholds;

/// Statistics for `channels` over the readings in `window`.
///
/// Returns [`Error::EmptyWindow`](crate::Error::EmptyWindow) when the window
/// selects nothing.
pub fn aggregate(
    dataset: &SensorDataset,
    window: &TimeWindow,
    channels: &[Channel],
) -> Result<BTreeMap<Channel, ChannelStats>> {
    let readings = dataset.slice(window)?;
    Ok(aggregate_readings(readings, channels))
}

/// Statistics for `channels` over an already selected set of readings.
pub fn aggregate_readings(
    readings: &[Reading],
    channels: &[Channel],
) -> BTreeMap<Channel, ChannelStats> {
    channels
        .iter()
        .map(|&channel| (channel, channel_stats(readings, channel)))
        .collect()
}

fn channel_stats(readings: &[Reading], channel: Channel) -> ChannelStats {
    let mut values: Vec<f64> = readings.iter().filter_map(|r| r.value(channel)).collect();
    let n = values.len();
    let missing_count = readings.len() - n;

    if n == 0 {
        debug!("No {} samples in {} readings", channel, readings.len());
        return ChannelStats {
            missing_count,
            ..ChannelStats::default()
        };
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let std_dev = (n >= 2).then(|| {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    });

    values.sort_by(f64::total_cmp);
    let mid = n / 2;
    let median = if n % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };

    ChannelStats {
        mean: Some(mean),
        min: Some(min),
        max: Some(max),
        median: Some(median),
        std_dev,
        sample_count: n,
        missing_count,
    }
}

/// How many individual readings fell into one band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandShare {
    pub band: ConditionBand,
    pub count: usize,
    /// Share of the channel's present samples, 0-100.
    pub percent: f64,
}

/// Per-reading band counts for every channel except motion.
///
/// Every band of the channel's table is listed, including empty ones.
/// Channels without samples are omitted.
pub fn band_distribution(
    readings: &[Reading],
    thresholds: &Thresholds,
) -> BTreeMap<Channel, Vec<BandShare>> {
    let mut out = BTreeMap::new();
    for channel in Channel::ALL {
        if channel == Channel::Motion {
            continue;
        }
        let table = thresholds.config().table(channel);
        let mut counts: Vec<(ConditionBand, usize)> =
            table.bands.iter().map(|&b| (b, 0)).collect();
        let mut total = 0usize;
        for value in readings.iter().filter_map(|r| r.value(channel)) {
            let band = table.classify(value);
            if let Some(slot) = counts.iter_mut().find(|(b, _)| *b == band) {
                slot.1 += 1;
                total += 1;
            }
        }
        if total == 0 {
            continue;
        }
        let shares = counts
            .into_iter()
            .map(|(band, count)| BandShare {
                band,
                count,
                percent: count as f64 * 100.0 / total as f64,
            })
            .collect();
        out.insert(channel, shares);
    }
    out
}

/// Motion activity for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyActivity {
    pub hour: u8,
    pub samples: usize,
    pub events: usize,
}

/// Motion activity for one day of the week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyActivity {
    pub weekday: String,
    pub samples: usize,
    pub events: usize,
}

/// When the building is used, derived from the PIR channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyProfile {
    pub total_events: usize,
    /// Hours of the day that have motion samples, ascending.
    pub hourly: Vec<HourlyActivity>,
    /// Weekdays that have motion samples, Monday first.
    pub daily: Vec<DailyActivity>,
    pub peak_hour: Option<u8>,
    pub peak_weekday: Option<String>,
    /// Hours with more events than the hourly average.
    pub high_usage_hours: Vec<u8>,
    /// Hours with fewer than half the hourly average.
    pub low_usage_hours: Vec<u8>,
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

/// Occupancy patterns by hour and weekday.
///
/// Returns `None` when no reading carries a motion value.
pub fn occupancy_profile(readings: &[Reading]) -> Option<OccupancyProfile> {
    let mut by_hour = [(0usize, 0usize); 24];
    let mut by_day = [(0usize, 0usize); 7];
    let mut total_events = 0;
    let mut any = false;

    for reading in readings {
        let Some(motion) = reading.motion_detected else {
            continue;
        };
        any = true;
        let hour = usize::from(reading.timestamp.hour());
        let day = usize::from(reading.timestamp.weekday().number_days_from_monday());
        by_hour[hour].0 += 1;
        by_day[day].0 += 1;
        if motion {
            by_hour[hour].1 += 1;
            by_day[day].1 += 1;
            total_events += 1;
        }
    }
    if !any {
        return None;
    }

    let hourly: Vec<HourlyActivity> = by_hour
        .iter()
        .enumerate()
        .filter(|(_, (samples, _))| *samples > 0)
        .map(|(hour, &(samples, events))| HourlyActivity {
            hour: hour as u8,
            samples,
            events,
        })
        .collect();
    let daily: Vec<DailyActivity> = by_day
        .iter()
        .zip(WEEKDAYS)
        .filter(|((samples, _), _)| *samples > 0)
        .map(|(&(samples, events), weekday)| DailyActivity {
            weekday: weekday.to_string(),
            samples,
            events,
        })
        .collect();

    // Earliest hour/day wins ties.
    let peak_hour = hourly
        .iter()
        .rev()
        .max_by_key(|h| h.events)
        .filter(|h| h.events > 0)
        .map(|h| h.hour);
    let peak_weekday = daily
        .iter()
        .rev()
        .max_by_key(|d| d.events)
        .filter(|d| d.events > 0)
        .map(|d| d.weekday.clone());

    let mean = total_events as f64 / hourly.len() as f64;
    let high_usage_hours = hourly
        .iter()
        .filter(|h| h.events as f64 > mean)
        .map(|h| h.hour)
        .collect();
    let low_usage_hours = hourly
        .iter()
        .filter(|h| (h.events as f64) < mean * 0.5)
        .map(|h| h.hour)
        .collect();

    Some(OccupancyProfile {
        total_events,
        hourly,
        daily,
        peak_hour,
        peak_weekday,
        high_usage_hours,
        low_usage_hours,
    })
}

/// Share of readings that were thermally comfortable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComfortSummary {
    /// Readings with both temperature and humidity present.
    pub samples: usize,
    /// Of those, readings whose temperature and humidity bands are both
    /// excellent-grade.
    pub comfortable: usize,
    pub percent: f64,
}

/// Thermal comfort share, or `None` when no reading has both temperature
/// and humidity.
pub fn comfort_summary(readings: &[Reading], thresholds: &Thresholds) -> Option<ComfortSummary> {
    let mut samples = 0;
    let mut comfortable = 0;
    for reading in readings {
        let (Some(t), Some(h)) = (reading.temperature_c, reading.humidity_pct) else {
            continue;
        };
        samples += 1;
        let t_ok = thresholds.classify_value(Channel::Temperature, t).grade() == Some(Grade::Excellent);
        let h_ok = thresholds.classify_value(Channel::Humidity, h).grade() == Some(Grade::Excellent);
        if t_ok && h_ok {
            comfortable += 1;
        }
    }
    (samples > 0).then(|| ComfortSummary {
        samples,
        comfortable,
        percent: comfortable as f64 * 100.0 / samples as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading(ts: time::OffsetDateTime) -> Reading {
        Reading::new(ts, "413")
    }

    fn co2_readings(values: &[Option<f64>]) -> Vec<Reading> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut r = reading(datetime!(2024-01-01 00:00:00 UTC) + time::Duration::hours(i as i64));
                r.co2_ppm = *v;
                r
            })
            .collect()
    }

    #[test]
    fn test_mean_min_max_std() {
        let readings = co2_readings(&[Some(500.0), Some(1200.0), Some(1600.0)]);
        let stats = aggregate_readings(&readings, &[Channel::Co2])[&Channel::Co2];
        assert_eq!(stats.mean, Some(1100.0));
        assert_eq!(stats.min, Some(500.0));
        assert_eq!(stats.max, Some(1600.0));
        assert_eq!(stats.median, Some(1200.0));
        assert_eq!(stats.sample_count, 3);
        assert_eq!(stats.missing_count, 0);
        let sd = stats.std_dev.unwrap();
        assert!((sd - 556.776).abs() < 0.01, "std_dev {sd}");
    }

    #[test]
    fn test_missing_values_excluded() {
        let readings = co2_readings(&[Some(400.0), None, Some(600.0), None]);
        let stats = aggregate_readings(&readings, &[Channel::Co2])[&Channel::Co2];
        assert_eq!(stats.mean, Some(500.0));
        assert_eq!(stats.median, Some(500.0));
        assert_eq!(stats.sample_count, 2);
        assert_eq!(stats.missing_count, 2);
    }

    #[test]
    fn test_single_sample_has_no_std_dev() {
        let readings = co2_readings(&[Some(400.0)]);
        let stats = aggregate_readings(&readings, &[Channel::Co2])[&Channel::Co2];
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.mean, Some(400.0));
    }

    #[test]
    fn test_all_missing_is_undefined_not_zero() {
        let readings = co2_readings(&[Some(400.0), Some(500.0)]);
        let stats = aggregate_readings(&readings, &[Channel::Humidity])[&Channel::Humidity];
        assert_eq!(stats.mean, None);
        assert_eq!(stats.min, None);
        assert_eq!(stats.median, None);
        assert_eq!(stats.sample_count, 0);
        assert_eq!(stats.missing_count, 2);
    }

    #[test]
    fn test_median_resists_outlier() {
        let readings = co2_readings(&[Some(2900.0), Some(500.0), Some(520.0), Some(480.0)]);
        let stats = aggregate_readings(&readings, &[Channel::Co2])[&Channel::Co2];
        assert_eq!(stats.median, Some(510.0));
        assert_eq!(stats.mean, Some(1100.0));
    }

    #[test]
    fn test_aggregate_empty_window() {
        let ds = SensorDataset::from_readings(co2_readings(&[Some(400.0)]));
        let window = TimeWindow::parse(Some("2030-01-01"), None).unwrap();
        assert!(matches!(
            aggregate(&ds, &window, &Channel::ALL),
            Err(crate::Error::EmptyWindow(_))
        ));
    }

    #[test]
    fn test_band_distribution() {
        let readings = co2_readings(&[Some(500.0), Some(550.0), Some(1200.0), None]);
        let dist = band_distribution(&readings, &Thresholds::default());
        let co2 = &dist[&Channel::Co2];
        assert_eq!(co2.len(), 4);
        assert_eq!(co2[0].band, ConditionBand::Excellent);
        assert_eq!(co2[0].count, 2);
        assert!((co2[0].percent - 66.666).abs() < 0.01);
        assert_eq!(co2[2].count, 1);
        assert!(!dist.contains_key(&Channel::Humidity));
        assert!(!dist.contains_key(&Channel::Motion));
    }

    #[test]
    fn test_occupancy_profile() {
        // 2024-01-01 is a Monday
        let mut readings = Vec::new();
        for (ts, motion) in [
            (datetime!(2024-01-01 09:00:00 UTC), true),
            (datetime!(2024-01-01 09:30:00 UTC), true),
            (datetime!(2024-01-01 13:00:00 UTC), true),
            (datetime!(2024-01-01 22:00:00 UTC), false),
            (datetime!(2024-01-02 09:15:00 UTC), true),
        ] {
            let mut r = reading(ts);
            r.motion_detected = Some(motion);
            readings.push(r);
        }
        readings.push(reading(datetime!(2024-01-02 10:00:00 UTC)));

        let profile = occupancy_profile(&readings).unwrap();
        assert_eq!(profile.total_events, 4);
        assert_eq!(profile.peak_hour, Some(9));
        assert_eq!(profile.peak_weekday.as_deref(), Some("Monday"));
        assert_eq!(profile.hourly.len(), 3);
        // mean = 4 events / 3 hours
        assert_eq!(profile.high_usage_hours, vec![9]);
        assert_eq!(profile.low_usage_hours, vec![22]);
        assert_eq!(profile.daily.len(), 2);
        assert_eq!(profile.daily[1].weekday, "Tuesday");
    }

    #[test]
    fn test_occupancy_profile_without_motion() {
        let readings = co2_readings(&[Some(400.0)]);
        assert!(occupancy_profile(&readings).is_none());
    }

    #[test]
    fn test_comfort_summary() {
        let mut readings = Vec::new();
        for (t, h) in [(Some(22.0), Some(45.0)), (Some(26.0), Some(45.0)), (Some(22.0), None)] {
            let mut r = reading(datetime!(2024-01-01 09:00:00 UTC));
            r.temperature_c = t;
            r.humidity_pct = h;
            readings.push(r);
        }
        let comfort = comfort_summary(&readings, &Thresholds::default()).unwrap();
        assert_eq!(comfort.samples, 2);
        assert_eq!(comfort.comfortable, 1);
        assert_eq!(comfort.percent, 50.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;

    fn arb_reading() -> impl Strategy<Value = Reading> {
        (
            0i64..10_000,
            proptest::option::of(300.0f64..3000.0),
            proptest::option::of(10.0f64..35.0),
            proptest::option::of(0.0f64..100.0),
            proptest::option::of(0.0f64..2000.0),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(minutes, co2, temp, hum, light, pir)| {
                let mut r = Reading::new(
                    datetime!(2024-01-01 00:00:00 UTC) + time::Duration::minutes(minutes),
                    "413",
                );
                r.co2_ppm = co2;
                r.temperature_c = temp;
                r.humidity_pct = hum;
                r.light_lux = light;
                r.motion_detected = pir;
                r
            })
    }

    proptest! {
        /// Present plus missing samples always account for every reading in the window.
        #[test]
        fn counts_cover_every_reading(
            readings in proptest::collection::vec(arb_reading(), 0..200),
            a in 0i64..10_000,
            len in 1i64..10_000,
        ) {
            let ds = SensorDataset::from_readings(readings);
            let start = datetime!(2024-01-01 00:00:00 UTC) + time::Duration::minutes(a);
            let window = TimeWindow::between(start, start + time::Duration::minutes(len)).unwrap();
            let slice = ds.readings_in(&window);
            for (_, stats) in aggregate_readings(slice, &Channel::ALL) {
                prop_assert_eq!(stats.sample_count + stats.missing_count, slice.len());
            }
        }

        /// Mean and median always lie between min and max.
        #[test]
        fn mean_is_bounded(readings in proptest::collection::vec(arb_reading(), 1..100)) {
            for (_, stats) in aggregate_readings(&readings, &Channel::ALL) {
                if let (Some(mean), Some(min), Some(max)) = (stats.mean, stats.min, stats.max) {
                    prop_assert!(min <= mean + 1e-9 && mean <= max + 1e-9);
                }
                if let (Some(median), Some(min), Some(max)) = (stats.median, stats.min, stats.max) {
                    prop_assert!(min <= median && median <= max);
                }
            }
        }
    }
}
