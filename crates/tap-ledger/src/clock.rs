//! Time sources for date-bound policies

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Supplies the evaluation time of an operation
pub trait Clock {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a chosen instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Pin to `now`
    #[inline]
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    /// Pin to midnight UTC of a date
    #[must_use]
    pub fn at_date(date: NaiveDate) -> Self {
        Self(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }

    /// Pin to midnight UTC of `year-month-day`; `None` if no such date
    #[must_use]
    pub fn on_date(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::at_date)
    }

    /// Move the clock
    #[inline]
    pub fn set(&mut self, now: DateTime<Utc>) {
        self.0 = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn fixed_clock_reports_date() {
        let clock = FixedClock::on_date(2026, 10, 18).unwrap();
        let now = clock.now();
        assert_eq!((now.year(), now.month(), now.day()), (2026, 10, 18));
    }

    #[test]
    fn fixed_clock_rejects_impossible_date() {
        assert!(FixedClock::on_date(2026, 2, 29).is_none());
        assert!(FixedClock::on_date(2028, 2, 29).is_some());
    }
}
