//! Stable storage shared by every logic revision
//!
//! The arena outlives any logic module. Modules reach it through a
//! [`StorageLayout`], and the upgrade controller refuses a module whose
//! layout is not a compatible successor of the installed one.

mod arena;
mod layout;

pub use arena::{SlotValue, StorageArena, StorageError};
pub use layout::{
    FieldKind, FieldSpec, LayoutError, LayoutFingerprint, SchemaStamp, SlotId, StorageLayout,
};

/// Fields of the price ledger schema
pub mod fields {
    use super::{FieldKind, FieldSpec, StorageLayout};

    /// Set once by `initialize`
    pub const INITIALIZED: FieldSpec = FieldSpec::new(0, "initialized", FieldKind::Flag);

    /// Owner fixed at initialization
    pub const OWNER: FieldSpec = FieldSpec::new(1, "owner", FieldKind::Identity);

    /// Calendar key to price mapping
    pub const PRICES: FieldSpec = FieldSpec::new(2, "prices", FieldKind::Prices);

    /// Layout shared by V1, V2 and V3
    pub static PRICE_LEDGER_LAYOUT: StorageLayout = StorageLayout {
        name: "price-ledger",
        version: 1,
        fields: &[INITIALIZED, OWNER, PRICES],
    };
}
