//! Inclusive day walks

use crate::key::CalendarKey;

/// Consecutive keys from `from` through `to`, both included
///
/// Crosses month boundaries using the fixed table, so February 28th is
/// followed by March 1st.
#[derive(Debug, Clone)]
pub struct DayRange {
    next: Option<CalendarKey>,
    end: CalendarKey,
}

impl DayRange {
    /// Create a walk; empty if `to` precedes `from`
    #[must_use]
    pub fn new(from: CalendarKey, to: CalendarKey) -> Self {
        Self {
            next: (from <= to).then_some(from),
            end: to,
        }
    }

    /// Number of days still to be yielded
    #[must_use]
    pub fn day_count(&self) -> u16 {
        self.next
            .map_or(0, |n| self.end.ordinal() - n.ordinal() + 1)
    }
}

impl Iterator for DayRange {
    type Item = CalendarKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current == self.end {
            None
        } else {
            current.next()
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = usize::from(self.day_count());
        (n, Some(n))
    }
}

impl ExactSizeIterator for DayRange {}
