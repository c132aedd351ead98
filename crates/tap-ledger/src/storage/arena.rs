//! The stable storage region

use super::layout::{FieldKind, FieldSpec, SchemaStamp, SlotId, StorageLayout};
use crate::identity::Identity;
use crate::Price;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tap_calendar::CalendarKey;

/// Value held in one arena slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    /// Boolean flag
    Flag(bool),
    /// Single identity
    Identity(Identity),
    /// Calendar key to price mapping
    Prices(BTreeMap<CalendarKey, Price>),
}

impl SlotValue {
    /// Kind of this value
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            SlotValue::Flag(_) => FieldKind::Flag,
            SlotValue::Identity(_) => FieldKind::Identity,
            SlotValue::Prices(_) => FieldKind::Prices,
        }
    }
}

/// Slot-addressed storage owned by the upgrade controller
///
/// Logic modules borrow it for the length of one call and reach fields only
/// through the [`FieldSpec`]s of their layout. Slots never written read as
/// the zero value of their kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageArena {
    stamp: Option<SchemaStamp>,
    slots: BTreeMap<SlotId, SlotValue>,
}

impl StorageArena {
    /// Create an empty arena
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing was ever written
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.stamp.is_none()
    }

    /// Layout the arena was last written under
    #[inline]
    #[must_use]
    pub fn stamp(&self) -> Option<SchemaStamp> {
        self.stamp
    }

    /// Record `layout` as the active schema
    pub(crate) fn set_stamp(&mut self, layout: &StorageLayout) {
        self.stamp = Some(layout.stamp());
    }

    /// Read a flag; unset reads `false`
    ///
    /// # Errors
    /// [`StorageError::KindMismatch`] if the field or the stored value is not a flag
    pub fn flag(&self, field: &FieldSpec) -> Result<bool, StorageError> {
        expect_kind(field, FieldKind::Flag)?;
        match self.slots.get(&field.slot) {
            None => Ok(false),
            Some(SlotValue::Flag(v)) => Ok(*v),
            Some(other) => Err(mismatch(field, other)),
        }
    }

    /// Read an identity; unset reads `None`
    ///
    /// # Errors
    /// [`StorageError::KindMismatch`] if the field or the stored value is not an identity
    pub fn identity(&self, field: &FieldSpec) -> Result<Option<Identity>, StorageError> {
        expect_kind(field, FieldKind::Identity)?;
        match self.slots.get(&field.slot) {
            None => Ok(None),
            Some(SlotValue::Identity(id)) => Ok(Some(*id)),
            Some(other) => Err(mismatch(field, other)),
        }
    }

    /// Read a price map; unset reads `None`
    ///
    /// # Errors
    /// [`StorageError::KindMismatch`] if the field or the stored value is not a price map
    pub fn prices(
        &self,
        field: &FieldSpec,
    ) -> Result<Option<&BTreeMap<CalendarKey, Price>>, StorageError> {
        expect_kind(field, FieldKind::Prices)?;
        match self.slots.get(&field.slot) {
            None => Ok(None),
            Some(SlotValue::Prices(map)) => Ok(Some(map)),
            Some(other) => Err(mismatch(field, other)),
        }
    }

    /// Write a flag
    ///
    /// # Errors
    /// [`StorageError::KindMismatch`] if the field or the stored value is not a flag
    pub fn set_flag(&mut self, field: &FieldSpec, value: bool) -> Result<(), StorageError> {
        self.flag(field)?;
        self.slots.insert(field.slot, SlotValue::Flag(value));
        Ok(())
    }

    /// Write an identity
    ///
    /// # Errors
    /// [`StorageError::KindMismatch`] if the field or the stored value is not an identity
    pub fn set_identity(&mut self, field: &FieldSpec, value: Identity) -> Result<(), StorageError> {
        self.identity(field)?;
        self.slots.insert(field.slot, SlotValue::Identity(value));
        Ok(())
    }

    /// Mutable price map, created empty on first use
    ///
    /// # Errors
    /// [`StorageError::KindMismatch`] if the field or the stored value is not a price map
    pub fn prices_mut(
        &mut self,
        field: &FieldSpec,
    ) -> Result<&mut BTreeMap<CalendarKey, Price>, StorageError> {
        self.prices(field)?;
        let slot = self
            .slots
            .entry(field.slot)
            .or_insert_with(|| SlotValue::Prices(BTreeMap::new()));
        match slot {
            SlotValue::Prices(map) => Ok(map),
            // checked by `prices` above
            other => Err(mismatch(field, other)),
        }
    }
}

fn expect_kind(field: &FieldSpec, expected: FieldKind) -> Result<(), StorageError> {
    if field.kind == expected {
        Ok(())
    } else {
        Err(StorageError::KindMismatch {
            slot: field.slot,
            expected,
            found: field.kind,
        })
    }
}

fn mismatch(field: &FieldSpec, stored: &SlotValue) -> StorageError {
    StorageError::KindMismatch {
        slot: field.slot,
        expected: field.kind,
        found: stored.kind(),
    }
}

/// Arena access failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Slot accessed as the wrong kind
    #[error("slot {slot} holds {found}, expected {expected}")]
    KindMismatch {
        /// Slot
        slot: SlotId,
        /// Kind the accessor wanted
        expected: FieldKind,
        /// Kind actually found
        found: FieldKind,
    },
}
