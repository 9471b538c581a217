use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Whole calendar days from `start` to `today`. Negative when `start` lies in the future.
pub fn elapsed_days(start: NaiveDate, today: NaiveDate) -> i64 {
    today.signed_duration_since(start).num_days()
}

/// Days since `date`, as seen from `today`.
pub fn days_since(date: NaiveDate, today: NaiveDate) -> i64 {
    elapsed_days(date, today)
}

/// The reporting timezone used to turn attempt timestamps into calendar days.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
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

    /// Returns `None` when the offset is outside ±24h.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        let seconds = minutes.checked_mul(60)?;
        FixedOffset::east_opt(seconds).map(|offset| Self { offset })
    }

    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    /// Days between the local date of `at` and `today`, truncated to midnight.
    pub fn days_since(&self, at: DateTime<Utc>, today: NaiveDate) -> i64 {
        days_since(self.local_date(at), today)
    }
}
