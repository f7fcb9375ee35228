//! Time-of-day representation for schedule windows.
//!
//! The itinerary covers a single day ashore, so times are plain
//! minutes-since-midnight values with no date attached. Cross-midnight
//! windows are not supported; the difference helper wraps defensively
//! anyway so malformed data degrades instead of producing negatives.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrackingError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time of day, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    minutes: u32,
}

impl TimeOfDay {
    /// Build from hour and minute components.
    ///
    /// Returns a parse error when `hour > 23` or `minute > 59`.
    pub fn new(hour: u32, minute: u32) -> crate::Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(TrackingError::parse(
                "time-of-day",
                format!("{hour:02}:{minute:02} out of range"),
            ));
        }
        Ok(Self { minutes: hour * 60 + minute })
    }

    /// Total minutes since midnight.
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn hour(&self) -> u32 {
        self.minutes / 60
    }

    pub fn minute(&self) -> u32 {
        self.minutes % 60
    }

    /// Current local wall-clock time, truncated to the minute.
    pub fn now_local() -> Self {
        let now = chrono::Local::now().time();
        Self { minutes: now.hour() * 60 + now.minute() }
    }

    /// Minutes from `self` until `later`, wrapping past midnight when the
    /// raw difference is negative.
    ///
    /// The wrap only matters for malformed windows (`end < start`), which
    /// the schedule validator rejects; it keeps gap math total regardless.
    pub fn until(&self, later: TimeOfDay) -> u32 {
        let diff = later.minutes as i64 - self.minutes as i64;
        if diff < 0 { (diff + MINUTES_PER_DAY as i64) as u32 } else { diff as u32 }
    }
}

impl FromStr for TimeOfDay {
    type Err = TrackingError;

    /// Parse `"HH:MM"` (also accepts `"H:MM"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| TrackingError::parse("time-of-day", format!("missing ':' in {s:?}")))?;
        let hour: u32 = h
            .parse()
            .map_err(|_| TrackingError::parse("time-of-day", format!("bad hour in {s:?}")))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| TrackingError::parse("time-of-day", format!("bad minute in {s:?}")))?;
        Self::new(hour, minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TrackingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}
