//! Simulation time model.
//!
//! # Design
//!
//! Time is an integer count of seconds since the Unix epoch, wrapped in
//! [`SimTime`].  Configured timestamps are naive (no time zone) and are read
//! as UTC, so the mapping is a plain offset:
//!
//!   sim_time = naive_datetime.and_utc().timestamp()
//!
//! Integer seconds keep all schedule arithmetic exact; dwell times, travel
//! times and delays are all whole seconds.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

const SECS_PER_DAY: i64 = 86_400;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation instant, in seconds since the Unix epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(pub i64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// Convert a naive timestamp (read as UTC).
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        SimTime(dt.and_utc().timestamp())
    }

    /// Parse an ISO-8601 timestamp such as `2024-03-04T07:30:00`.
    ///
    /// A trailing `Z` or numeric offset is accepted and honoured.
    pub fn parse_iso(s: &str) -> Result<SimTime, chrono::ParseError> {
        let s = s.trim();
        match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            Ok(dt) => Ok(SimTime::from_naive(dt)),
            Err(_) => DateTime::parse_from_rfc3339(s).map(|dt| SimTime(dt.timestamp())),
        }
    }

    /// Back to a naive timestamp; `None` if out of chrono's range.
    pub fn to_naive(self) -> Option<NaiveDateTime> {
        DateTime::from_timestamp(self.0, 0).map(|dt| dt.naive_utc())
    }

    /// The instant `secs` seconds after `self` (negative moves backwards).
    #[inline]
    pub fn offset(self, secs: i64) -> SimTime {
        SimTime(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> i64 {
        self.0 - earlier.0
    }

    /// Seconds since midnight of the same day.
    #[inline]
    pub fn seconds_of_day(self) -> i64 {
        self.0.rem_euclid(SECS_PER_DAY)
    }

    /// Midnight of the day containing `self`.
    #[inline]
    pub fn day_start(self) -> SimTime {
        SimTime(self.0 - self.seconds_of_day())
    }

    /// Whole minutes elapsed since `origin`, floored; negative before it.
    #[inline]
    pub fn minutes_since(self, origin: SimTime) -> i64 {
        self.since(origin).div_euclid(60)
    }
}

impl std::ops::Add<i64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: i64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl std::ops::Sub for SimTime {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: SimTime) -> i64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            None     => write!(f, "t{}", self.0),
        }
    }
}

// ── TimeWindow ────────────────────────────────────────────────────────────────

/// A half-open interval `[start, end)` of simulation time.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: SimTime,
    pub end:   SimTime,
}

impl TimeWindow {
    pub fn new(start: SimTime, end: SimTime) -> Self {
        Self { start, end }
    }

    /// `true` if `t` lies in `[start, end)`.
    #[inline]
    pub fn contains(&self, t: SimTime) -> bool {
        self.start <= t && t < self.end
    }

    /// Length in seconds (0 for an inverted window).
    #[inline]
    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).max(0)
    }

    /// The overlap of two windows, `None` if it is empty.
    pub fn intersect(&self, other: &TimeWindow) -> Option<TimeWindow> {
        let w = TimeWindow::new(self.start.max(other.start), self.end.min(other.end));
        (w.start < w.end).then_some(w)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
