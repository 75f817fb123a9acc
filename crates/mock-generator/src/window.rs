//! Time window handling.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use rand::Rng;

use crate::generator::GeneratorError;

/// The `[start, end]` range generated events fall into. `end` is "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window. `start` must be strictly before `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, GeneratorError> {
        if start >= end {
            return Err(GeneratorError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window ending at `now`, starting at `start` or `now - lookback`.
    pub fn ending_at(
        start: Option<DateTime<Utc>>,
        lookback: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Self, GeneratorError> {
        Self::new(start.unwrap_or(now - lookback), now)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Never later than the end of the window.
    pub fn clamp(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        instant.min(self.end)
    }

    /// Time left between `instant` and the end of the window.
    pub fn remaining_after(&self, instant: DateTime<Utc>) -> TimeDelta {
        self.end - instant
    }

    /// Uniformly random instant in the window, millisecond precision.
    pub fn random_instant<R: Rng>(&self, rng: &mut R) -> DateTime<Utc> {
        let span_ms = (self.end - self.start).num_milliseconds() as f64;
        let offset = (rng.random::<f64>() * span_ms) as i64;
        self.clamp(self.start + TimeDelta::milliseconds(offset))
    }
}

/// Parse a timestamp given on the command line.
///
/// Accepts RFC 3339 / ISO 8601 (`2024-01-01T00:00:00.000Z`) or a bare date
/// (`2024-01-01`, taken as midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// ISO 8601 with millisecond precision and a `Z` suffix.
pub fn to_iso8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
