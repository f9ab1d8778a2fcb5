//! Wall-clock relative event window.
//!
//! An event is shown when its kickoff falls inside
//! `[now - lookback, now + lookahead]`, both ends inclusive.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Default days before `now` still shown.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 4;

/// Default days after `now` already shown.
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub lookback: Duration,
    pub lookahead: Duration,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::from_days(DEFAULT_LOOKBACK_DAYS, DEFAULT_LOOKAHEAD_DAYS)
    }
}

impl TimeWindow {
    pub fn from_days(lookback_days: i64, lookahead_days: i64) -> Self {
        Self {
            lookback: Duration::days(lookback_days),
            lookahead: Duration::days(lookahead_days),
        }
    }

    /// Whether `at` lies in the window anchored on `now`.
    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        at >= now - self.lookback && at <= now + self.lookahead
    }

    /// Whether a raw upstream timestamp lies in the window.
    /// Absent or unparseable timestamps never do.
    pub fn contains_raw(&self, date: Option<&str>, now: DateTime<Utc>) -> bool {
        date.and_then(parse_timestamp)
            .map(|at| self.contains(at, now))
            .unwrap_or(false)
    }
}

/// Parse an upstream timestamp.
///
/// ESPN emits minute-precision UTC times (`2024-08-17T14:00Z`) which
/// RFC 3339 rejects, so those are tried after the strict format.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S%.fZ"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
