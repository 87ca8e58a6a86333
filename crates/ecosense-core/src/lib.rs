//! Sensor analytics and sustainability report engine.
//!
//! This crate turns a building's environmental sensor history (CO2,
//! temperature, humidity, light and PIR motion) into windowed statistics,
//! condition bands, a 0-100 sustainability score and ranked
//! recommendations.
//!
//! # Features
//!
//! - **Loading**: CSV exports with skip-and-count handling of malformed rows
//! - **Aggregation**: mean/min/max/std-dev over half-open time windows
//! - **Classification**: configurable per-channel threshold tables
//! - **Scoring**: grade-based penalties with ranked deficiencies
//! - **Reports**: single-window and baseline comparison reports with trends
//! - **Queries**: a small operation set plus keyword-based question routing
//!
//! # Quick Start
//!
//! ```no_run
//! use ecosense_core::{Engine, source};
//! use ecosense_types::TimeWindow;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (dataset, load) = source::read_csv("building_413.csv")?;
//!     println!("Loaded {} readings, skipped {}", dataset.len(), load.malformed.len());
//!
//!     let engine = Engine::default();
//!     let window = TimeWindow::parse(Some("2024-01-01"), Some("2024-01-31"))?;
//!     let report = engine.get_stats(&dataset, &window)?;
//!     println!("Score: {:?}", report.score);
//!     for rec in &report.recommendations {
//!         println!("{}. {}", rec.rank, rec.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! [`SensorDataset`] is immutable after loading and every operation takes it
//! by shared reference. An [`Engine`] holds only configuration, so both can
//! be shared across threads without locking.

pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod intent;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod source;
pub mod thresholds;

pub use aggregate::{
    BandShare, ComfortSummary, DailyActivity, HourlyActivity, OccupancyProfile, aggregate,
    aggregate_readings, band_distribution, comfort_summary, occupancy_profile,
};
pub use config::AnalysisConfig;
pub use dataset::{
    DatasetBuilder, DatasetSummary, FieldCompleteness, LoadReport, PlausibleRanges, RawRecord,
    SensorDataset,
};
pub use engine::{Engine, Query, QueryResponse};
pub use error::{Error, MalformedReason, MalformedRecord, Result};
pub use intent::{IntentClassifier, KeywordClassifier};
pub use recommend::{Recommendation, RecommendationCatalog};
pub use report::{
    ChannelDelta, DataWarning, ReportSummary, ReportSynthesizer, SustainabilityReport,
};
pub use scoring::{Deficiency, PenaltyConfig, ScoreCard, Scorer};
pub use thresholds::{Polarity, ThresholdConfig, ThresholdTable, Thresholds};

// Re-export the shared types so callers need a single dependency.
pub use ecosense_types;
