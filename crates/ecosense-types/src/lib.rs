//! Platform-agnostic types for building environmental sensor analytics.
//!
//! This crate provides the shared vocabulary used by the analysis engine
//! (`ecosense-core`) and the command-line front end (`ecosense-cli`).
//!
//! # Features
//!
//! - Sensor channels and readings
//! - Half-open time windows with ISO-8601 bound parsing
//! - Channel statistics, condition bands, grades and trends
//! - Error types for parsing
//!
//! # Example
//!
//! ```
//! use ecosense_types::{Channel, ConditionBand, Grade, TimeWindow};
//!
//! let window = TimeWindow::parse(Some("2024-01-01"), Some("2024-01-31")).unwrap();
//! assert!(window.start().is_some());
//! assert_eq!("temp".parse::<Channel>().unwrap(), Channel::Temperature);
//! assert_eq!(ConditionBand::Poor.grade(), Some(Grade::Poor));
//! ```

pub mod error;
pub mod types;
pub mod window;

pub use error::{ParseError, ParseResult};
pub use types::{Channel, ChannelStats, ConditionBand, Grade, Reading, Trend};
pub use window::{TimeWindow, format_timestamp, parse_date, parse_end_bound, parse_timestamp};

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    // --- Channel tests ---

    #[test]
    fn test_channel_priority_order() {
        let mut shuffled = vec![
            Channel::Light,
            Channel::Humidity,
            Channel::Co2,
            Channel::Motion,
            Channel::Temperature,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Channel::ALL.to_vec());
        assert_eq!(Channel::Co2.priority(), 0);
        assert_eq!(Channel::Light.priority(), 4);
    }

    #[test]
    fn test_channel_from_str_aliases() {
        assert_eq!("CO2".parse::<Channel>().unwrap(), Channel::Co2);
        assert_eq!("co2_ppm".parse::<Channel>().unwrap(), Channel::Co2);
        assert_eq!("temperature_c".parse::<Channel>().unwrap(), Channel::Temperature);
        assert_eq!("humidity".parse::<Channel>().unwrap(), Channel::Humidity);
        assert_eq!("pir".parse::<Channel>().unwrap(), Channel::Motion);
        assert_eq!("lux".parse::<Channel>().unwrap(), Channel::Light);
    }

    #[test]
    fn test_channel_from_str_unknown() {
        let err = "pressure".parse::<Channel>().unwrap_err();
        assert_eq!(err, ParseError::UnknownChannel("pressure".to_string()));
        assert_eq!(err.to_string(), "Unknown channel: pressure");
    }

    #[test]
    fn test_channel_display_roundtrips_through_from_str() {
        for channel in Channel::ALL {
            assert_eq!(channel.to_string().parse::<Channel>().unwrap(), channel);
        }
    }

    // --- Reading tests ---

    #[test]
    fn test_reading_value() {
        let mut reading = Reading::new(datetime!(2024-01-01 09:00:00 UTC), "413");
        assert_eq!(reading.value(Channel::Co2), None);
        assert_eq!(reading.value(Channel::Motion), None);

        reading.co2_ppm = Some(812.0);
        reading.motion_detected = Some(true);
        assert_eq!(reading.value(Channel::Co2), Some(812.0));
        assert_eq!(reading.value(Channel::Motion), Some(1.0));

        reading.motion_detected = Some(false);
        assert_eq!(reading.value(Channel::Motion), Some(0.0));
    }

    // --- ChannelStats tests ---

    #[test]
    fn test_unavailable_stats() {
        let stats = ChannelStats::unavailable();
        assert!(!stats.has_data());
        assert_eq!(stats.mean, None);
        assert_eq!(stats.reading_count(), 0);
        assert_eq!(stats.completeness(), None);
    }

    #[test]
    fn test_all_missing_has_zero_completeness() {
        let stats = ChannelStats {
            sample_count: 0,
            missing_count: 4,
            ..Default::default()
        };
        assert_eq!(stats.completeness(), Some(0.0));
        assert!(!stats.has_data());
    }

    // --- Grade and band tests ---

    #[test]
    fn test_grade_ordering() {
        assert!(Grade::Excellent < Grade::Good);
        assert!(Grade::Good < Grade::Moderate);
        assert!(Grade::Moderate < Grade::Poor);
    }

    #[test]
    fn test_band_grades() {
        assert_eq!(ConditionBand::Excellent.grade(), Some(Grade::Excellent));
        assert_eq!(ConditionBand::Adequate.grade(), Some(Grade::Excellent));
        assert_eq!(ConditionBand::Low.grade(), Some(Grade::Excellent));
        assert_eq!(ConditionBand::Bright.grade(), Some(Grade::Good));
        assert_eq!(ConditionBand::Vacant.grade(), Some(Grade::Good));
        assert_eq!(ConditionBand::Cold.grade(), Some(Grade::Moderate));
        assert_eq!(ConditionBand::Crowded.grade(), Some(Grade::Moderate));
        assert_eq!(ConditionBand::Damp.grade(), Some(Grade::Poor));
        assert_eq!(ConditionBand::Excessive.grade(), Some(Grade::Poor));
    }

    #[test]
    fn test_band_is_deficient() {
        assert!(!ConditionBand::Good.is_deficient());
        assert!(!ConditionBand::Unknown.is_deficient());
        assert!(ConditionBand::Moderate.is_deficient());
        assert!(ConditionBand::Hot.is_deficient());
    }

    #[test]
    fn test_band_from_str() {
        assert_eq!("Humid".parse::<ConditionBand>().unwrap(), ConditionBand::Humid);
        assert!(matches!(
            "freezing".parse::<ConditionBand>(),
            Err(ParseError::UnknownBand(_))
        ));
    }

    // --- Serialization tests ---

    #[cfg(feature = "serde")]
    #[test]
    fn test_reading_serialization() {
        let mut reading = Reading::new(datetime!(2024-01-01 09:00:00 UTC), "413");
        reading.temperature_c = Some(22.5);

        let json = serde_json::to_string(&reading).unwrap();
        assert!(json.contains("\"timestamp\":\"2024-01-01T09:00:00Z\""));
        assert!(json.contains("\"temperature_c\":22.5"));
        assert!(json.contains("\"co2_ppm\":null"));

        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reading);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_enum_serialization_is_snake_case() {
        assert_eq!(serde_json::to_string(&Channel::Co2).unwrap(), "\"co2\"");
        assert_eq!(
            serde_json::to_string(&ConditionBand::Comfortable).unwrap(),
            "\"comfortable\""
        );
        assert_eq!(serde_json::to_string(&Trend::Worsening).unwrap(), "\"worsening\"");
        let grade: Grade = serde_json::from_str("\"moderate\"").unwrap();
        assert_eq!(grade, Grade::Moderate);
    }
}
