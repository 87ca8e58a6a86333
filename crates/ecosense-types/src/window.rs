//! Half-open time windows and timestamp bound parsing.

use core::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::{ParseError, ParseResult};

/// A half-open interval `[start, end)` over reading timestamps.
///
/// Either bound may be open, in which case the window extends to the
/// beginning or end of the dataset. A window with both bounds always has
/// `start < end`.
///
/// ```
/// use ecosense_types::TimeWindow;
///
/// let w = TimeWindow::parse(Some("2024-01-01"), Some("2024-01-01")).unwrap();
/// // A date-only end bound covers that whole day.
/// assert_eq!(w.to_string(), "2024-01-01T00:00:00Z .. 2024-01-02T00:00:00Z");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimeWindow {
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    start: Option<OffsetDateTime>,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339::option"))]
    end: Option<OffsetDateTime>,
}

impl TimeWindow {
    /// Create a window from optional bounds.
    ///
    /// Returns [`ParseError::InvalidWindow`] when both bounds are present and
    /// `start >= end`.
    pub fn new(start: Option<OffsetDateTime>, end: Option<OffsetDateTime>) -> ParseResult<Self> {
        if let (Some(s), Some(e)) = (start, end)
            && s >= e
        {
            return Err(ParseError::InvalidWindow {
                start: format_timestamp(s),
                end: format_timestamp(e),
            });
        }
        Ok(Self { start, end })
    }

    /// Window with both bounds set.
    pub fn between(start: OffsetDateTime, end: OffsetDateTime) -> ParseResult<Self> {
        Self::new(Some(start), Some(end))
    }

    /// Window from `start` to the end of the data.
    #[must_use]
    pub fn since(start: OffsetDateTime) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Window from the beginning of the data up to `end` (exclusive).
    #[must_use]
    pub fn until(end: OffsetDateTime) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Window covering the whole dataset.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Window covering one calendar day (UTC).
    pub fn day(date: Date) -> ParseResult<Self> {
        Self::days(date, date)
    }

    /// Window covering `first` through `last`, both days inclusive.
    pub fn days(first: Date, last: Date) -> ParseResult<Self> {
        let start = PrimitiveDateTime::new(first, Time::MIDNIGHT).assume_utc();
        Self::between(start, end_of_day(last)?)
    }

    /// Parse optional ISO-8601 bounds.
    ///
    /// A date-only `end` means the end of that day, so
    /// `parse(Some("2024-01-01"), Some("2024-01-01"))` selects the whole day.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> ParseResult<Self> {
        let start = start.map(parse_timestamp).transpose()?;
        let end = end.map(parse_end_bound).transpose()?;
        Self::new(start, end)
    }

    /// Inclusive lower bound, if any.
    #[must_use]
    pub fn start(&self) -> Option<OffsetDateTime> {
        self.start
    }

    /// Exclusive upper bound, if any.
    #[must_use]
    pub fn end(&self) -> Option<OffsetDateTime> {
        self.end
    }

    /// Whether both bounds are open.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether `ts` falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, ts: OffsetDateTime) -> bool {
        self.start.is_none_or(|s| ts >= s) && self.end.is_none_or(|e| ts < e)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Some(s) => f.write_str(&format_timestamp(s))?,
            None => f.write_str("(start)")?,
        }
        f.write_str(" .. ")?;
        match self.end {
            Some(e) => f.write_str(&format_timestamp(e)),
            None => f.write_str("(end)"),
        }
    }
}

/// Parse a timestamp in RFC 3339, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD` form.
///
/// Values without an offset are taken as UTC. A bare date is midnight.
pub fn parse_timestamp(s: &str) -> ParseResult<OffsetDateTime> {
    let s = s.trim();
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(dt.to_offset(time::UtcOffset::UTC));
    }
    if let Some(dt) = parse_naive(s) {
        return Ok(dt.assume_utc());
    }
    let date = parse_date(s)?;
    Ok(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

/// Parse an exclusive end bound. A bare date is the end of that day.
pub fn parse_end_bound(s: &str) -> ParseResult<OffsetDateTime> {
    match parse_date(s) {
        Ok(date) => end_of_day(date),
        Err(_) => parse_timestamp(s),
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> ParseResult<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), &format).map_err(|_| ParseError::InvalidTimestamp(s.to_string()))
}

/// Format a timestamp as RFC 3339, falling back to the debug form.
#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| format!("{ts:?}"))
}

fn parse_naive(s: &str) -> Option<PrimitiveDateTime> {
    let space = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let tee = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(s, &space)
        .or_else(|_| PrimitiveDateTime::parse(s, &tee))
        .ok()
}

fn end_of_day(date: Date) -> ParseResult<OffsetDateTime> {
    let next = date
        .next_day()
        .ok_or_else(|| ParseError::InvalidTimestamp(date.to_string()))?;
    Ok(PrimitiveDateTime::new(next, Time::MIDNIGHT).assume_utc())
}
