//! Query operations exposed to callers.
//!
//! [`Engine`] is the entry point used by front ends: it maps each operation
//! onto the report pipeline and wraps results in a serializable
//! [`QueryResponse`].
//!
//! # Example
//!
//! ```
//! use ecosense_core::{Engine, Query, QueryResponse, RawRecord, SensorDataset};
//!
//! let (dataset, _) = SensorDataset::load(vec![
//!     RawRecord::new("2024-01-01 09:00:00", "413").co2("1800"),
//! ]);
//! let engine = Engine::default();
//!
//! let QueryResponse::Recommendations(recs) = engine.execute(&dataset, &Query::Recommendations).unwrap() else {
//!     panic!("unexpected response");
//! };
//! assert_eq!(recs[0].rank, 1);
//! ```

use serde::Serialize;
use tracing::debug;

use ecosense_types::TimeWindow;

use crate::config::AnalysisConfig;
use crate::dataset::{DatasetSummary, SensorDataset};
use crate::error::Result;
use crate::recommend::Recommendation;
use crate::report::{ReportSynthesizer, SustainabilityReport};

/// A request against a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// What the dataset holds.
    Summary,
    /// Full report for one window.
    Stats { window: TimeWindow },
    /// Ranked recommendations over the whole dataset.
    Recommendations,
    /// Report for `current` with `baseline` embedded as the comparison.
    Compare {
        current: TimeWindow,
        baseline: TimeWindow,
    },
}

/// Result of executing a [`Query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum QueryResponse {
    Summary(DatasetSummary),
    Report(Box<SustainabilityReport>),
    Recommendations(Vec<Recommendation>),
}

/// Stateless query executor.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    synthesizer: ReportSynthesizer,
}

impl Engine {
    /// Create an engine; fails with
    /// [`Error::InvalidConfig`](crate::Error::InvalidConfig) when the
    /// configuration does not validate.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Ok(Self {
            synthesizer: ReportSynthesizer::new(config)?,
        })
    }

    pub fn synthesizer(&self) -> &ReportSynthesizer {
        &self.synthesizer
    }

    /// Dataset overview.
    pub fn summary(&self, dataset: &SensorDataset) -> DatasetSummary {
        dataset.summary()
    }

    /// Report for one window.
    pub fn get_stats(
        &self,
        dataset: &SensorDataset,
        window: &TimeWindow,
    ) -> Result<SustainabilityReport> {
        self.synthesizer.build_report(dataset, window, None)
    }

    /// Ranked recommendations computed over the full dataset span.
    pub fn get_recommendations(&self, dataset: &SensorDataset) -> Result<Vec<Recommendation>> {
        let report = self
            .synthesizer
            .build_report(dataset, &TimeWindow::unbounded(), None)?;
        Ok(report.recommendations)
    }

    /// Report for `current` compared against `baseline`.
    pub fn compare_periods(
        &self,
        dataset: &SensorDataset,
        current: &TimeWindow,
        baseline: &TimeWindow,
    ) -> Result<SustainabilityReport> {
        self.synthesizer.build_report(dataset, current, Some(baseline))
    }

    /// Dispatch a query.
    pub fn execute(&self, dataset: &SensorDataset, query: &Query) -> Result<QueryResponse> {
        debug!("Executing {:?}", query);
        let response = match query {
            Query::Summary => QueryResponse::Summary(self.summary(dataset)),
            Query::Stats { window } => {
                QueryResponse::Report(Box::new(self.get_stats(dataset, window)?))
            }
            Query::Recommendations => {
                QueryResponse::Recommendations(self.get_recommendations(dataset)?)
            }
            Query::Compare { current, baseline } => QueryResponse::Report(Box::new(
                self.compare_periods(dataset, current, baseline)?,
            )),
        };
        Ok(response)
    }
}
