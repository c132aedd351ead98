//! Write authorization, one policy per revision
//!
//! Policies are stateless predicates over the caller, the owner, the key and
//! the evaluation time. Swapping one for another never touches storage.
//! Reads are never authorized; every revision leaves them open.

use crate::identity::Identity;
use chrono::{DateTime, Utc};
use std::fmt;
use tap_calendar::CalendarKey;

/// Everything a policy may look at
#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    /// Identity submitting the write
    pub caller: &'a Identity,
    /// Owner fixed at initialization
    pub owner: &'a Identity,
    /// Validated target key
    pub key: CalendarKey,
    /// Evaluation time
    pub now: DateTime<Utc>,
}

impl WriteRequest<'_> {
    /// Check if the caller is the owner
    #[inline]
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.caller == self.owner
    }

    /// UTC calendar key of `now`; `None` on February 29th
    #[inline]
    #[must_use]
    pub fn today(&self) -> Option<CalendarKey> {
        CalendarKey::from_datetime(self.now)
    }
}

/// Authorization decision for writes
pub trait AccessPolicy: fmt::Debug + Send + Sync {
    /// Short policy name for logs
    fn name(&self) -> &'static str;

    /// Allow or deny with a reason
    ///
    /// # Errors
    /// [`PolicyError`] naming why the write is denied
    fn authorize(&self, request: &WriteRequest<'_>) -> Result<(), PolicyError>;

    /// Plain predicate form of [`AccessPolicy::authorize`]
    fn can_write(&self, request: &WriteRequest<'_>) -> bool {
        self.authorize(request).is_ok()
    }
}

/// Anyone may write any valid key
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenPolicy;

impl AccessPolicy for OpenPolicy {
    fn name(&self) -> &'static str {
        "open"
    }

    fn authorize(&self, _request: &WriteRequest<'_>) -> Result<(), PolicyError> {
        Ok(())
    }
}

/// Only the owner may write
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerPolicy;

impl AccessPolicy for OwnerPolicy {
    fn name(&self) -> &'static str {
        "owner"
    }

    fn authorize(&self, request: &WriteRequest<'_>) -> Result<(), PolicyError> {
        if request.is_owner() {
            Ok(())
        } else {
            Err(PolicyError::Unauthorized)
        }
    }
}

/// Only the owner, and only for today's UTC date
///
/// Ownership is checked first, so a stranger always sees
/// [`PolicyError::Unauthorized`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerTodayPolicy;

impl AccessPolicy for OwnerTodayPolicy {
    fn name(&self) -> &'static str {
        "owner-today"
    }

    fn authorize(&self, request: &WriteRequest<'_>) -> Result<(), PolicyError> {
        OwnerPolicy.authorize(request)?;
        let today = request.today();
        if today == Some(request.key) {
            Ok(())
        } else {
            Err(PolicyError::NotTodaysDate {
                requested: request.key,
                today,
            })
        }
    }
}

/// Write denials
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Caller lacks write permission
    #[error("caller is not the owner")]
    Unauthorized,

    /// Owner tried to set a day other than today
    #[error("only today's price may be set")]
    NotTodaysDate {
        /// Key the caller tried to write
        requested: CalendarKey,
        /// Today's key, `None` on February 29th
        today: Option<CalendarKey>,
    },
}
