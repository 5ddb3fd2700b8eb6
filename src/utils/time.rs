//! Time utilities: parsing HH:MM[:SS], time-zone settings, time-of-day tolerance checks.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Duration, Local, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    let t = t.trim();
    NaiveTime::parse_from_str(t, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
        .ok()
}

pub fn parse_time_strict(t: &str) -> AppResult<NaiveTime> {
    parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))
}

/// Storage format for times of day.
pub fn format_time(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

/// Storage format for full timestamps.
pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    const FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|d| d.naive_local()))
}

/// True when `b` lies within `tolerance` of `a` on the 24h clock, both ends inclusive.
/// The comparison wraps over midnight: 23:30 and 00:15 are 45 minutes apart.
pub fn within_tolerance(a: NaiveTime, b: NaiveTime, tolerance: Duration) -> bool {
    let sa = a.num_seconds_from_midnight() as i64;
    let sb = b.num_seconds_from_midnight() as i64;
    let diff = (sa - sb).abs();
    let circular = diff.min(SECONDS_PER_DAY - diff);
    circular <= tolerance.num_seconds()
}

/// Time zone used for "now" and for interpreting unix timestamps coming from the attendance store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeZoneSetting {
    Local,
    Named(Tz),
}

impl TimeZoneSetting {
    /// Accepts `local` or any IANA zone name (`UTC`, `Asia/Kolkata`, `America/New_York`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("local") {
            return Some(Self::Local);
        }
        s.parse::<Tz>().ok().map(Self::Named)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.from_utc(Utc::now())
    }

    pub fn from_utc(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        match self {
            TimeZoneSetting::Local => utc.with_timezone(&Local).naive_local(),
            TimeZoneSetting::Named(tz) => utc.with_timezone(tz).naive_local(),
        }
    }

    /// Convert unix seconds into a wall-clock timestamp in this zone.
    pub fn from_unix(&self, secs: i64) -> Option<NaiveDateTime> {
        DateTime::<Utc>::from_timestamp(secs, 0).map(|u| self.from_utc(u))
    }
}

/// Which instant is used to decide the active serving windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowClock {
    /// Wall-clock time when the swipe is evaluated.
    Now,
    /// The swipe's own timestamp.
    EventTime,
}

impl WindowClock {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "now" => Some(Self::Now),
            "event" | "event_time" => Some(Self::EventTime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowClock::Now => "now",
            WindowClock::EventTime => "event",
        }
    }
}
