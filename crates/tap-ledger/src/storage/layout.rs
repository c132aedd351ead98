//! Versioned storage layouts and the upgrade compatibility check

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Position of a field in the storage arena
pub type SlotId = u32;

/// Type of value a slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Boolean flag
    Flag,
    /// Single identity
    Identity,
    /// Calendar key to price mapping
    Prices,
}

impl FieldKind {
    fn tag(self) -> u8 {
        match self {
            FieldKind::Flag => 0,
            FieldKind::Identity => 1,
            FieldKind::Prices => 2,
        }
    }
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One named, typed field at a fixed slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    /// Arena slot
    pub slot: SlotId,
    /// Field name, stable across revisions
    pub name: &'static str,
    /// Value type
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Create a field spec
    #[inline]
    #[must_use]
    pub const fn new(slot: SlotId, name: &'static str, kind: FieldKind) -> Self {
        Self { slot, name, kind }
    }
}

/// The storage schema a logic module reads and writes
///
/// A successor layout must keep every existing field at its slot with the
/// same name and kind, and may only append new fields after the last slot.
/// See [`StorageLayout::check_successor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageLayout {
    /// Schema name
    pub name: &'static str,
    /// Schema version, never decreases across upgrades
    pub version: u32,
    /// Fields in slot order
    pub fields: &'static [FieldSpec],
}

impl StorageLayout {
    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field by slot
    #[must_use]
    pub fn field_at(&self, slot: SlotId) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.slot == slot)
    }

    /// Look up a field the caller cannot work without
    ///
    /// # Errors
    /// [`LayoutError::MissingField`] if the layout does not declare `name`
    pub fn require(&self, name: &'static str) -> Result<&FieldSpec, LayoutError> {
        self.field(name).ok_or(LayoutError::MissingField { name })
    }

    /// Highest slot in use
    #[must_use]
    pub fn last_slot(&self) -> Option<SlotId> {
        self.fields.iter().map(|f| f.slot).max()
    }

    /// Check internal consistency: no slot or name appears twice
    ///
    /// # Errors
    /// [`LayoutError::DuplicateSlot`] or [`LayoutError::DuplicateName`]
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut slots = BTreeSet::new();
        let mut names = BTreeSet::new();
        for f in self.fields {
            if !slots.insert(f.slot) {
                return Err(LayoutError::DuplicateSlot { slot: f.slot });
            }
            if !names.insert(f.name) {
                return Err(LayoutError::DuplicateName { name: f.name });
            }
        }
        Ok(())
    }

    /// Check that `next` can take over storage written under `self`
    ///
    /// # Errors
    /// The first violation found, in this order: `next` is internally
    /// inconsistent, version went backwards, an existing field was removed,
    /// renamed or retyped, a new field was inserted before the end, or new
    /// fields were added without a version bump.
    pub fn check_successor(&self, next: &StorageLayout) -> Result<(), LayoutError> {
        next.validate()?;

        if next.version < self.version {
            return Err(LayoutError::VersionRegressed {
                from: self.version,
                to: next.version,
            });
        }

        for old in self.fields {
            let Some(new) = next.field_at(old.slot) else {
                return Err(LayoutError::FieldRemoved {
                    slot: old.slot,
                    name: old.name,
                });
            };
            if new.name != old.name {
                return Err(LayoutError::FieldRenamed {
                    slot: old.slot,
                    from: old.name,
                    to: new.name,
                });
            }
            if new.kind != old.kind {
                return Err(LayoutError::FieldRetyped {
                    slot: old.slot,
                    name: old.name,
                    from: old.kind,
                    to: new.kind,
                });
            }
        }

        let boundary = self.last_slot();
        let mut appended = false;
        for new in next.fields.iter().filter(|f| self.field_at(f.slot).is_none()) {
            if boundary.is_some_and(|last| new.slot <= last) {
                return Err(LayoutError::InsertedBeforeEnd {
                    slot: new.slot,
                    name: new.name,
                });
            }
            appended = true;
        }

        if appended && next.version == self.version {
            return Err(LayoutError::VersionNotBumped {
                version: self.version,
            });
        }

        Ok(())
    }

    /// SHA-256 over version and fields
    #[must_use]
    pub fn fingerprint(&self) -> LayoutFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.version.to_le_bytes());
        for f in self.fields {
            hasher.update(f.slot.to_le_bytes());
            hasher.update([f.kind.tag()]);
            hasher.update(f.name.as_bytes());
            hasher.update([0]);
        }
        LayoutFingerprint(hasher.finalize().into())
    }

    /// Stamp recorded in the arena while this layout is active
    #[inline]
    #[must_use]
    pub fn stamp(&self) -> SchemaStamp {
        SchemaStamp {
            version: self.version,
            fingerprint: self.fingerprint(),
        }
    }
}

/// Digest identifying a layout's exact shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct LayoutFingerprint([u8; 32]);

impl LayoutFingerprint {
    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for LayoutFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for LayoutFingerprint {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<LayoutFingerprint> for String {
    fn from(fp: LayoutFingerprint) -> Self {
        fp.to_string()
    }
}

impl TryFrom<String> for LayoutFingerprint {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Which layout last wrote the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaStamp {
    /// Layout version
    pub version: u32,
    /// Layout fingerprint
    pub fingerprint: LayoutFingerprint,
}

impl Display for SchemaStamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "v{}:{}", self.version, self.fingerprint.short())
    }
}

/// Storage layout violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Layout lacks a field its user requires
    #[error("layout has no field '{name}'")]
    MissingField {
        /// Field name
        name: &'static str,
    },

    /// Two fields share a slot
    #[error("slot {slot} declared twice")]
    DuplicateSlot {
        /// Slot
        slot: SlotId,
    },

    /// Two fields share a name
    #[error("field '{name}' declared twice")]
    DuplicateName {
        /// Field name
        name: &'static str,
    },

    /// Successor version is lower
    #[error("layout version went backwards: {from} -> {to}")]
    VersionRegressed {
        /// Current version
        from: u32,
        /// Proposed version
        to: u32,
    },

    /// Successor appends fields without bumping the version
    #[error("new fields appended but version {version} unchanged")]
    VersionNotBumped {
        /// Unchanged version
        version: u32,
    },

    /// Existing field missing from successor
    #[error("field '{name}' at slot {slot} removed")]
    FieldRemoved {
        /// Slot
        slot: SlotId,
        /// Field name
        name: &'static str,
    },

    /// Existing slot reused under another name
    #[error("slot {slot} renamed '{from}' -> '{to}'")]
    FieldRenamed {
        /// Slot
        slot: SlotId,
        /// Current name
        from: &'static str,
        /// Proposed name
        to: &'static str,
    },

    /// Existing field reinterpreted as another type
    #[error("field '{name}' at slot {slot} retyped {from} -> {to}")]
    FieldRetyped {
        /// Slot
        slot: SlotId,
        /// Field name
        name: &'static str,
        /// Current kind
        from: FieldKind,
        /// Proposed kind
        to: FieldKind,
    },

    /// New field placed at or before the current last slot
    #[error("new field '{name}' at slot {slot} is not appended after existing fields")]
    InsertedBeforeEnd {
        /// Slot
        slot: SlotId,
        /// Field name
        name: &'static str,
    },
}
