//! Logic revisions and the forward-only upgrade rule

use crate::error::UpgradeError;
use crate::logic::{LedgerLogic, LedgerV1, LedgerV2, LedgerV3};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Logic revisions, in order of increasing write restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
    /// Anyone may write
    V1,
    /// Owner only
    V2,
    /// Owner only, today's date only
    V3,
}

impl Revision {
    /// All revisions in upgrade order
    pub const ALL: [Revision; 3] = [Revision::V1, Revision::V2, Revision::V3];

    /// Revision number, 1 to 3
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            Revision::V1 => 1,
            Revision::V2 => 2,
            Revision::V3 => 3,
        }
    }

    /// Stock logic module for this revision
    #[must_use]
    pub fn module(self) -> Box<dyn LedgerLogic> {
        match self {
            Revision::V1 => Box::new(LedgerV1),
            Revision::V2 => Box::new(LedgerV2),
            Revision::V3 => Box::new(LedgerV3),
        }
    }
}

impl Display for Revision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u8())
    }
}

impl FromStr for Revision {
    type Err = UnknownRevision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Revision::V1),
            "v2" | "2" => Ok(Revision::V2),
            "v3" | "3" => Ok(Revision::V3),
            _ => Err(UnknownRevision(s.to_string())),
        }
    }
}

/// Text that names no revision
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown revision '{0}'")]
pub struct UnknownRevision(pub String);

/// Validates a revision swap.
///
/// Only forward moves are allowed. Skipping a revision is a forward move;
/// re-installing the current one or going back is not.
pub fn validate_upgrade(from: Revision, to: Revision) -> Result<(), UpgradeError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(UpgradeError::NotForward { from, to })
    }
}

/// Revisions that may replace `from`, in upgrade order
pub fn allowed_upgrades(from: Revision) -> Vec<Revision> {
    use Revision::*;
    match from {
        V1 => vec![V2, V3],
        V2 => vec![V3],
        V3 => vec![],
    }
}

fn allowed(from: Revision, to: Revision) -> bool {
    allowed_upgrades(from).into_iter().any(|r| r == to)
}
