//! Error types for the ledger
//!
//! Every failure is reported to the caller with its specific reason and
//! leaves the arena untouched:
//! - calendar validation (always checked first)
//! - authorization under the installed revision
//! - initialization guard
//! - upgrade rejections

use crate::revision::Revision;
use crate::storage::{LayoutError, StorageError};
use tap_calendar::{CalendarError, CalendarKey};

pub use crate::logging::LogError;
pub use crate::policy::PolicyError;

/// Main ledger error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Month or day rejected by the calendar
    #[error(transparent)]
    Calendar(#[from] CalendarError),

    /// Write denied by the installed revision's policy
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// `initialize` already ran
    #[error("already initialized")]
    AlreadyInitialized,

    /// Operation before `initialize`
    #[error("not initialized")]
    NotInitialized,

    /// Average requested over a window that ends before it starts
    #[error("range end {to} precedes start {from}")]
    RangeReversed {
        /// Start key
        from: CalendarKey,
        /// End key
        to: CalendarKey,
    },

    /// Upgrade refused
    #[error("upgrade rejected: {0}")]
    Upgrade(#[from] UpgradeError),

    /// Arena accessed inconsistently with its layout
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl LedgerError {
    /// Check if the input key was the problem
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Calendar(_) | Self::RangeReversed { .. })
    }

    /// Check if the caller was not allowed to do this
    #[inline]
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Policy(_))
    }
}

impl From<LayoutError> for LedgerError {
    fn from(value: LayoutError) -> Self {
        LedgerError::Upgrade(UpgradeError::Layout(value))
    }
}

/// Why a logic swap was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpgradeError {
    /// Target revision is not later than the installed one
    #[error("revision {to} does not move forward from {from}")]
    NotForward {
        /// Installed revision
        from: Revision,
        /// Proposed revision
        to: Revision,
    },

    /// Target layout cannot read the existing storage
    #[error("incompatible storage layout: {0}")]
    Layout(#[from] LayoutError),
}
