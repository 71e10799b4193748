// Time-of-day handling for class sessions.
//
// Clients send either a bare "HH:MM" or a full timestamp. Both are reduced to a
// minute-resolution NaiveTime so sessions entered either way compare against
// each other without dragging a calendar date along.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike, Utc};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    #[error("time value is empty")]
    Empty,

    #[error("'{0}' is not a valid time of day (expected HH:MM)")]
    InvalidClock(String),

    #[error("'{0}' is not a valid timestamp")]
    InvalidTimestamp(String),

    #[error("end time must be after start time")]
    EndNotAfterStart,
}

const NAIVE_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a client-supplied time into a time of day.
///
/// Values containing `T` or `-` are read as timestamps. One carrying a UTC
/// offset is an absolute instant and keeps its UTC time of day; a naive one
/// keeps the time as written. Everything else must be `H:MM`, `HH:MM` or
/// `HH:MM:SS`. Seconds are always dropped.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, TimeError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TimeError::Empty);
    }

    let time = if value.contains('T') || value.contains('-') {
        parse_timestamp(value)?
    } else {
        parse_clock(value)?
    };

    Ok(truncate_to_minute(time))
}

fn parse_clock(value: &str) -> Result<NaiveTime, TimeError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| TimeError::InvalidClock(value.to_string()))
}

fn parse_timestamp(value: &str) -> Result<NaiveTime, TimeError> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.with_timezone(&Utc).time());
    }

    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.time())
        .ok_or_else(|| TimeError::InvalidTimestamp(value.to_string()))
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// A half-open `[start, end)` span within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    /// Build a range, rejecting empty or inverted spans.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeError> {
        if start >= end {
            return Err(TimeError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// Wrap a span read back from storage without re-validating it.
    pub(crate) fn stored(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Strict overlap: ranges that only touch at a boundary do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}
