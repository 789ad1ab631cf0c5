use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::transaction::Timestamp;

/// A calendar month. `month` is a 0-based index (0 = January) to match the
/// persisted budget format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year: year + (month / 12) as i32,
            month: month % 12,
        }
    }

    /// The previous calendar month, rolling back across year boundaries.
    pub fn prev(self) -> Self {
        if self.month == 0 {
            Self { year: self.year - 1, month: 11 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 11 {
            Self { year: self.year + 1, month: 0 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The month `n` months before this one.
    pub fn back(self, n: u32) -> Self {
        let total = self.year as i64 * 12 + self.month as i64 - n as i64;
        Self {
            year: total.div_euclid(12) as i32,
            month: total.rem_euclid(12) as u32,
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
    }

    /// Number of days in this month (28..=31).
    pub fn days(self) -> u32 {
        match (self.first_day(), self.next().first_day()) {
            (Some(start), Some(end)) => (end - start).num_days() as u32,
            _ => 30,
        }
    }

    /// Weekday of the 1st, 0 = Sunday.
    pub fn first_weekday(self) -> u32 {
        self.first_day()
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month + 1)
    }
}

/// Converts epoch-millisecond timestamps into calendar dates at a fixed UTC offset.
///
/// Every month/week/weekday computation in the crate goes through a `Calendar`,
/// so the same data always buckets the same way regardless of the host timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar at the host's current local offset (captured once).
    pub fn local() -> Self {
        Self {
            offset: Local::now().offset().fix(),
        }
    }

    /// Calendar at a fixed offset east of UTC, in minutes (e.g. 420 for UTC+7).
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, CoreError> {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "UTC offset of {minutes} minutes is out of range"
                ))
            })?;
        Ok(Self { offset })
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    pub fn datetime(&self, ts: Timestamp) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp_millis(ts).map(|dt| dt.with_timezone(&self.offset))
    }

    pub fn date(&self, ts: Timestamp) -> Option<NaiveDate> {
        self.datetime(ts).map(|dt| dt.date_naive())
    }

    pub fn year_month(&self, ts: Timestamp) -> Option<YearMonth> {
        self.date(ts).map(|d| YearMonth::new(d.year(), d.month0()))
    }

    /// Day of week, 0 = Sunday ... 6 = Saturday.
    pub fn weekday(&self, ts: Timestamp) -> Option<u32> {
        self.date(ts).map(|d| d.weekday().num_days_from_sunday())
    }

    /// Day of month, 1-based.
    pub fn day_of_month(&self, ts: Timestamp) -> Option<u32> {
        self.date(ts).map(|d| d.day())
    }

    /// Timestamp of a wall-clock moment in this calendar. `month` is 0-based.
    pub fn timestamp(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Option<Timestamp> {
        self.offset
            .with_ymd_and_hms(year, month + 1, day, hour, minute, 0)
            .single()
            .map(|dt| dt.timestamp_millis())
    }
}
