//! Month-granularity calendar helpers for roadshow scheduling.

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

/// A (year, month) key. Serializes as the first day of the month
/// (`YYYY-MM-01`) so it can be fed straight back as a `date` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateBucket {
    pub year: i32,
    pub month: u32,
}

impl DateBucket {
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

impl Serialize for DateBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{:04}-{:02}-01", self.year, self.month))
    }
}

/// The date range a temporary roadshow location is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoadshowWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl RoadshowWindow {
    /// `true` when the start month or the end month is `bucket`.
    ///
    /// Only the two boundary months are compared: a roadshow running
    /// January through March does not match February.
    #[must_use]
    pub fn touches_month(&self, bucket: DateBucket) -> bool {
        bucket.contains(self.start_date) || bucket.contains(self.end_date)
    }

    /// Both boundary buckets, start first.
    #[must_use]
    pub fn buckets(&self) -> [DateBucket; 2] {
        [DateBucket::of(self.start_date), DateBucket::of(self.end_date)]
    }
}
