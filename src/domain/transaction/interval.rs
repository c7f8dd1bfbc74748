//! Fixed bucket widths accepted by the by-time aggregation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use thiserror::Error;

/// Monday 2000-01-03 00:00:00 UTC, the origin TimescaleDB's `time_bucket`
/// uses for widths below one month.
const BUCKET_ORIGIN_SECS: i64 = 946_857_600;

/// Width of a time bucket.
///
/// The string form (`"1 hour"`, `"1 week"`, ...) is both the query parameter
/// value and a valid PostgreSQL `interval` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketInterval {
    OneMinute,
    FiveMinutes,
    TenMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    SixHours,
    TwelveHours,
    OneDay,
    OneWeek,
    OneMonth,
}

impl BucketInterval {
    pub const ALL: [BucketInterval; 12] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::TenMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::TwoHours,
        Self::SixHours,
        Self::TwelveHours,
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1 minute",
            Self::FiveMinutes => "5 minutes",
            Self::TenMinutes => "10 minutes",
            Self::FifteenMinutes => "15 minutes",
            Self::ThirtyMinutes => "30 minutes",
            Self::OneHour => "1 hour",
            Self::TwoHours => "2 hours",
            Self::SixHours => "6 hours",
            Self::TwelveHours => "12 hours",
            Self::OneDay => "1 day",
            Self::OneWeek => "1 week",
            Self::OneMonth => "1 month",
        }
    }

    /// Comma-separated list of every accepted value, for error messages.
    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(|i| i.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Fixed width in seconds. `None` for calendar months.
    pub fn fixed_seconds(&self) -> Option<i64> {
        let minutes = match self {
            Self::OneMinute => 1,
            Self::FiveMinutes => 5,
            Self::TenMinutes => 10,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
            Self::OneHour => 60,
            Self::TwoHours => 120,
            Self::SixHours => 360,
            Self::TwelveHours => 720,
            Self::OneDay => 1_440,
            Self::OneWeek => 10_080,
            Self::OneMonth => return None,
        };
        Some(minutes * 60)
    }

    /// Start of the bucket containing `time`, aligned the way `time_bucket` aligns.
    pub fn truncate(&self, time: DateTime<Utc>) -> DateTime<Utc> {
        match self.fixed_seconds() {
            Some(width) => {
                let offset = (time.timestamp() - BUCKET_ORIGIN_SECS).div_euclid(width) * width;
                DateTime::from_timestamp(BUCKET_ORIGIN_SECS + offset, 0).unwrap_or(time)
            }
            None => Utc
                .with_ymd_and_hms(time.year(), time.month(), 1, 0, 0, 0)
                .single()
                .unwrap_or(time),
        }
    }
}

impl fmt::Display for BucketInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported interval '{0}'")]
pub struct UnknownInterval(pub String);

impl FromStr for BucketInterval {
    type Err = UnknownInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| UnknownInterval(s.to_string()))
    }
}
