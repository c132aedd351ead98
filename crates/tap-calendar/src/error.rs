//! Calendar validation errors

/// Why a raw `(month, day)` pair was rejected
///
/// The display strings match the reasons the ledger has always reported,
/// so callers matching on text keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum CalendarError {
    /// Month outside `1..=12`
    #[error("unavailable month")]
    InvalidMonth {
        /// Rejected month value
        month: u32,
    },

    /// Day outside `1..=days_in_month(month)` for a valid month
    #[error("unavailable day")]
    InvalidDay {
        /// Month the day was checked against
        month: u32,
        /// Rejected day value
        day: u32,
    },

    /// Text form was not `MM-DD`
    #[error("malformed calendar key")]
    Malformed,
}

impl CalendarError {
    /// Check if the month component was the problem
    #[inline]
    #[must_use]
    pub fn is_month(&self) -> bool {
        matches!(self, Self::InvalidMonth { .. })
    }

    /// Check if the day component was the problem
    #[inline]
    #[must_use]
    pub fn is_day(&self) -> bool {
        matches!(self, Self::InvalidDay { .. })
    }
}
