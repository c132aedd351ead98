//! TAP Calendar
//!
//! Month/day keys for the daily price ledger, validated against a fixed
//! month-length table. There is no leap-year logic anywhere: February
//! always has 28 days, so the calendar has exactly 365 keys.
//!
//! # Core Concepts
//!
//! - [`validate`]: the single admission check for raw `(month, day)` input
//! - [`CalendarKey`]: a pair that already passed [`validate`]
//! - [`DayRange`]: inclusive walk over consecutive keys, crossing months
//!
//! # Example
//!
//! ```rust
//! use tap_calendar::{validate, CalendarError};
//!
//! let key = validate(2, 28).unwrap();
//! assert_eq!(key.ordinal(), 59);
//! assert_eq!(validate(2, 29), Err(CalendarError::InvalidDay { month: 2, day: 29 }));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod key;
mod range;

pub use error::CalendarError;
pub use key::{days_in_month, validate, CalendarKey, DAYS_IN_MONTH, DAYS_IN_YEAR};
pub use range::DayRange;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
