//! Error types for ecosense-core.
//!
//! Only structural problems abort a request. Row-level defects found while
//! loading are collected as [`MalformedRecord`]s in the
//! [`LoadReport`](crate::LoadReport), and missing channel data surfaces as a
//! report warning rather than an error.
//!
//! | Error | Raised by | Meaning |
//! |-------|-----------|---------|
//! | [`Error::EmptyWindow`] | slicing, aggregation, reports | No readings in the requested window |
//! | [`Error::Parse`] | window construction | Bad timestamp or inverted window |
//! | [`Error::InvalidConfig`] | config validation | Threshold or penalty table is inconsistent |
//! | [`Error::Csv`] / [`Error::Io`] | CSV source | The input could not be read at all |

use thiserror::Error;

use ecosense_types::{ParseError, TimeWindow};

/// Errors that can occur while loading or analysing sensor data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The window selected no readings.
    #[error("No readings in window {0}")]
    EmptyWindow(TimeWindow),

    /// A timestamp or window bound could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The CSV input is structurally broken.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type alias using ecosense-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a row was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum MalformedReason {
    /// The row has no timestamp column value.
    MissingTimestamp,
    /// The timestamp is present but unparseable.
    InvalidTimestamp {
        /// Raw timestamp text.
        value: String,
    },
    /// The row has no building id.
    MissingBuildingId,
    /// The row belongs to a different building than the dataset.
    ForeignBuilding {
        /// The dataset's building id.
        expected: String,
        /// The id found on the row.
        found: String,
    },
    /// The CSV record could not be decoded into fields.
    Undecodable {
        /// Decoder message.
        message: String,
    },
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::MissingTimestamp => write!(f, "missing timestamp"),
            MalformedReason::InvalidTimestamp { value } => {
                write!(f, "invalid timestamp '{value}'")
            }
            MalformedReason::MissingBuildingId => write!(f, "missing building id"),
            MalformedReason::ForeignBuilding { expected, found } => {
                write!(f, "building id '{found}' does not match dataset building '{expected}'")
            }
            MalformedReason::Undecodable { message } => write!(f, "undecodable record: {message}"),
        }
    }
}

/// A skipped input row.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("Malformed record at row {row}: {reason}")]
pub struct MalformedRecord {
    /// One-based data row number (header excluded).
    pub row: usize,
    /// What was wrong with it.
    pub reason: MalformedReason,
}
