//! Calendar keys and the fixed month-length table

use crate::error::CalendarError;
use crate::range::DayRange;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Days per month, January first. February is fixed at 28.
pub const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Number of distinct keys in the calendar
pub const DAYS_IN_YEAR: u16 = 365;

/// Length of `month` from the fixed table, `None` outside `1..=12`
#[inline]
#[must_use]
pub fn days_in_month(month: u32) -> Option<u8> {
    match month {
        1..=12 => Some(DAYS_IN_MONTH[(month - 1) as usize]),
        _ => None,
    }
}

/// Validate a raw `(month, day)` pair
///
/// The month is checked first: `(13, 40)` reports
/// [`CalendarError::InvalidMonth`], never a day error.
///
/// # Errors
/// - [`CalendarError::InvalidMonth`] if `month` is outside `1..=12`
/// - [`CalendarError::InvalidDay`] if `day` is outside the month's length
#[allow(clippy::cast_possible_truncation)]
pub fn validate(month: u32, day: u32) -> Result<CalendarKey, CalendarError> {
    let max = days_in_month(month).ok_or(CalendarError::InvalidMonth { month })?;
    if day == 0 || day > u32::from(max) {
        return Err(CalendarError::InvalidDay { month, day });
    }
    // both bounded by the table above
    Ok(CalendarKey {
        month: month as u8,
        day: day as u8,
    })
}

/// A validated month/day pair
///
/// Only obtainable through [`validate`] (or the constructors that call it),
/// so holding one is proof the pair exists in the fixed calendar.
/// Ordering is calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CalendarKey {
    month: u8,
    day: u8,
}

impl CalendarKey {
    /// January 1st
    pub const FIRST: Self = Self { month: 1, day: 1 };

    /// December 31st
    pub const LAST: Self = Self { month: 12, day: 31 };

    /// Same as [`validate`]
    ///
    /// # Errors
    /// See [`validate`].
    #[inline]
    pub fn new(month: u32, day: u32) -> Result<Self, CalendarError> {
        validate(month, day)
    }

    /// Month, `1..=12`
    #[inline]
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Day of month, `1..=days_in_month`
    #[inline]
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Position in the year, `1..=365`
    #[must_use]
    pub fn ordinal(&self) -> u16 {
        let before: u16 = DAYS_IN_MONTH[..usize::from(self.month - 1)]
            .iter()
            .map(|&d| u16::from(d))
            .sum();
        before + u16::from(self.day)
    }

    /// Inverse of [`CalendarKey::ordinal`]
    #[must_use]
    pub fn from_ordinal(ordinal: u16) -> Option<Self> {
        if ordinal == 0 || ordinal > DAYS_IN_YEAR {
            return None;
        }
        let mut remaining = ordinal;
        for (idx, &len) in DAYS_IN_MONTH.iter().enumerate() {
            let len = u16::from(len);
            if remaining <= len {
                #[allow(clippy::cast_possible_truncation)]
                let key = Self {
                    month: idx as u8 + 1,
                    day: remaining as u8,
                };
                return Some(key);
            }
            remaining -= len;
        }
        None
    }

    /// The following day, `None` after December 31st
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        if self.day < DAYS_IN_MONTH[usize::from(self.month - 1)] {
            Some(Self {
                month: self.month,
                day: self.day + 1,
            })
        } else if self.month < 12 {
            Some(Self {
                month: self.month + 1,
                day: 1,
            })
        } else {
            None
        }
    }

    /// Key for a calendar date; `None` for February 29th
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        validate(date.month(), date.day()).ok()
    }

    /// Key for the UTC date of `now`
    #[inline]
    #[must_use]
    pub fn from_datetime(now: DateTime<Utc>) -> Option<Self> {
        Self::from_date(now.date_naive())
    }

    /// Inclusive walk from `self` to `to`
    ///
    /// Empty when `to` precedes `self`.
    #[inline]
    #[must_use]
    pub fn through(self, to: Self) -> DayRange {
        DayRange::new(self, to)
    }
}

impl Display for CalendarKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for CalendarKey {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month, day) = s.split_once('-').ok_or(CalendarError::Malformed)?;
        let month = month.trim().parse::<u32>().map_err(|_| CalendarError::Malformed)?;
        let day = day.trim().parse::<u32>().map_err(|_| CalendarError::Malformed)?;
        validate(month, day)
    }
}

impl From<CalendarKey> for String {
    fn from(key: CalendarKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for CalendarKey {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
