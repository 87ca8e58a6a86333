//! Error types for data parsing in ecosense-types.

use thiserror::Error;

/// Errors that can occur when parsing sensor data, channel names or
/// time window bounds.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The channel name is not one of the known sensor channels.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// The band name is not one of the known condition bands.
    #[error("Unknown condition band: {0}")]
    UnknownBand(String),

    /// The timestamp could not be parsed in any supported format.
    #[error("Invalid timestamp '{0}': expected RFC3339, YYYY-MM-DD HH:MM:SS or YYYY-MM-DD")]
    InvalidTimestamp(String),

    /// The window start is not strictly before its end.
    #[error("Invalid window: start {start} is not before end {end}")]
    InvalidWindow {
        /// Formatted start bound.
        start: String,
        /// Formatted end bound.
        end: String,
    },
}

/// Result type alias using ecosense-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
