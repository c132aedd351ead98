//! JSON snapshots of the ledger state
//!
//! A snapshot records which revision was installed, never the module
//! itself. Restoring rebuilds the stock module for that revision and
//! refuses storage written under a different layout.

use crate::clock::Clock;
use crate::logging::{EventLog, LogError};
use crate::proxy::PriceLedgerProxy;
use crate::revision::Revision;
use crate::storage::{fields, SchemaStamp, StorageArena, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Current snapshot format
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Serialized proxy state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySnapshot {
    pub format: u32,
    /// Installed revision; `None` before initialization
    pub implementation: Option<Revision>,
    pub arena: StorageArena,
    #[serde(default)]
    pub events: EventLog,
}

impl ProxySnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(SnapshotError::UnsupportedFormat(snapshot.format));
        }
        Ok(snapshot)
    }

    /// Write to `path`, replacing any existing file in one rename
    ///
    /// The JSON goes to a temporary file in the same directory first, so a
    /// failed save leaves the previous snapshot intact.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| SnapshotError::Io(e.error))?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl<C: Clock> PriceLedgerProxy<C> {
    /// Capture the current state
    pub fn snapshot(&self) -> ProxySnapshot {
        ProxySnapshot {
            format: SNAPSHOT_FORMAT,
            implementation: self.revision(),
            arena: self.arena().clone(),
            events: self.events().clone(),
        }
    }

    /// Rebuild a proxy from a snapshot
    ///
    /// # Errors
    /// - [`SnapshotError::StampMismatch`] if the arena was written under
    ///   a layout other than the recorded revision's
    /// - [`SnapshotError::UninitializedWithData`] if no revision is recorded
    ///   but the arena is not empty
    /// - [`SnapshotError::MissingOwner`] if an initialized arena has no owner
    /// - [`SnapshotError::Log`] if the event chain is broken
    pub fn restore(snapshot: ProxySnapshot, clock: C) -> Result<Self, SnapshotError> {
        snapshot.events.verify_integrity()?;

        let logic = match snapshot.implementation {
            None => {
                if !snapshot.arena.is_empty() {
                    return Err(SnapshotError::UninitializedWithData);
                }
                None
            }
            Some(revision) => {
                let module = revision.module();
                let expected = module.layout().stamp();
                if snapshot.arena.stamp() != Some(expected) {
                    return Err(SnapshotError::StampMismatch {
                        revision,
                        expected,
                        found: snapshot.arena.stamp(),
                    });
                }
                if !snapshot.arena.flag(&fields::INITIALIZED)? {
                    return Err(SnapshotError::UninitializedWithData);
                }
                if snapshot.arena.identity(&fields::OWNER)?.is_none() {
                    return Err(SnapshotError::MissingOwner);
                }
                Some(module)
            }
        };

        tracing::debug!(
            revision = ?snapshot.implementation,
            events = snapshot.events.len(),
            "ledger restored"
        );
        Ok(Self::from_parts(snapshot.arena, logic, snapshot.events, clock))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot format {0}")]
    UnsupportedFormat(u32),

    #[error("arena stamp {found:?} does not match {revision} layout {expected}")]
    StampMismatch {
        revision: Revision,
        expected: SchemaStamp,
        found: Option<SchemaStamp>,
    },

    #[error("snapshot records no initialized revision but carries state")]
    UninitializedWithData,

    #[error("initialized snapshot has no owner")]
    MissingOwner,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Log(#[from] LogError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LedgerAdmin, PriceFeed, PriceQuery};
    use crate::clock::FixedClock;
    use crate::identity::Identity;
    use pretty_assertions::assert_eq;

    fn clock() -> FixedClock {
        FixedClock::on_date(2026, 10, 18).unwrap()
    }

    #[test]
    fn round_trip_keeps_prices_owner_and_revision() {
        let owner = Identity::from_label("owner");
        let mut l = PriceLedgerProxy::with_clock(clock());
        l.initialize(owner).unwrap();
        l.set_price(&owner, 1, 31, 44).unwrap();
        l.upgrade(&owner, Revision::V2.module()).unwrap();

        let json = l.snapshot().to_json().unwrap();
        let back = PriceLedgerProxy::restore(ProxySnapshot::from_json(&json).unwrap(), clock()).unwrap();

        assert_eq!(back.snapshot(), l.snapshot());
        assert_eq!(back.revision(), Some(Revision::V2));
        assert_eq!(back.owner(), Ok(owner));
        assert_eq!(back.get_price(1, 31), Ok(44));
    }

    #[test]
    fn empty_snapshot_restores_uninitialized() {
        let l = PriceLedgerProxy::with_clock(clock());
        let back = PriceLedgerProxy::restore(l.snapshot(), clock()).unwrap();
        assert!(!back.is_initialized());
    }

    #[test]
    fn foreign_stamp_rejected() {
        let owner = Identity::from_label("owner");
        let mut l = PriceLedgerProxy::with_clock(clock());
        l.initialize(owner).unwrap();
        let mut snap = l.snapshot();
        snap.arena = StorageArena::new();
        assert!(matches!(
            PriceLedgerProxy::restore(snap, clock()),
            Err(SnapshotError::StampMismatch { found: None, .. })
        ));
    }

    #[test]
    fn data_without_revision_rejected() {
        let owner = Identity::from_label("owner");
        let mut l = PriceLedgerProxy::with_clock(clock());
        l.initialize(owner).unwrap();
        let mut snap = l.snapshot();
        snap.implementation = None;
        assert!(matches!(
            PriceLedgerProxy::restore(snap, clock()),
            Err(SnapshotError::UninitializedWithData)
        ));
    }

    #[test]
    fn initialized_without_owner_rejected() {
        let owner = Identity::from_label("owner");
        let mut l = PriceLedgerProxy::with_clock(clock());
        l.initialize(owner).unwrap();

        let mut json: serde_json::Value = serde_json::to_value(l.snapshot()).unwrap();
        let slots = json["arena"]["slots"].as_object_mut().unwrap();
        assert!(slots.remove(&fields::OWNER.slot.to_string()).is_some());
        let snap: ProxySnapshot = serde_json::from_value(json).unwrap();

        assert!(matches!(
            PriceLedgerProxy::restore(snap, clock()),
            Err(SnapshotError::MissingOwner)
        ));
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "stale").unwrap();

        let owner = Identity::from_label("owner");
        let mut l = PriceLedgerProxy::with_clock(clock());
        l.initialize(owner).unwrap();
        l.snapshot().save(&path).unwrap();

        assert_eq!(ProxySnapshot::load(&path).unwrap(), l.snapshot());
        // only the snapshot itself is left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let first = PriceLedgerProxy::with_clock(clock()).snapshot();
        first.save(&path).unwrap();

        // a directory in the way makes the final rename fail
        let blocked = dir.path().join("blocked");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("inner"), "x").unwrap();
        assert!(first.save(&blocked).is_err());

        assert_eq!(ProxySnapshot::load(&path).unwrap(), first);
    }

    #[test]
    fn unknown_format_rejected() {
        let mut snap = PriceLedgerProxy::with_clock(clock()).snapshot();
        snap.format = 99;
        let json = snap.to_json().unwrap();
        assert!(matches!(
            ProxySnapshot::from_json(&json),
            Err(SnapshotError::UnsupportedFormat(99))
        ));
    }
}
