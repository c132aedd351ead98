//! Replaceable logic modules
//!
//! A module holds no state. Each call borrows the arena from the upgrade
//! controller, validates keys, asks the module's policy about writes and
//! only then touches storage, so a failed call leaves the arena unchanged.

use crate::error::LedgerError;
use crate::identity::Identity;
use crate::policy::{AccessPolicy, OpenPolicy, OwnerPolicy, OwnerTodayPolicy, WriteRequest};
use crate::revision::Revision;
use crate::storage::fields::PRICE_LEDGER_LAYOUT;
use crate::storage::{StorageArena, StorageLayout};
use crate::store;
use crate::Price;
use chrono::{DateTime, Utc};
use std::fmt;
use tap_calendar::{validate, CalendarKey};

/// Invocation context supplied by the submission channel
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    /// Submitting identity
    pub caller: Identity,
    /// Evaluation time
    pub now: DateTime<Utc>,
}

/// Outcome of a successful write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceWrite {
    /// Key written
    pub key: CalendarKey,
    /// New price
    pub price: Price,
    /// Price replaced, `None` if the key was never set
    pub previous: Option<Price>,
}

/// One revision of the ledger logic
///
/// Implementors supply their revision, layout and policy; the read and
/// write paths are shared.
pub trait LedgerLogic: fmt::Debug + Send + Sync {
    /// Revision this module implements
    fn revision(&self) -> Revision;

    /// Storage schema this module reads and writes
    fn layout(&self) -> &StorageLayout;

    /// Write authorization in force while this module is installed
    fn policy(&self) -> &dyn AccessPolicy;

    /// Validate, authorize, then store
    ///
    /// # Errors
    /// - [`LedgerError::Calendar`] for an invalid key, before any policy check
    /// - [`LedgerError::Policy`] if the policy denies the caller
    /// - [`LedgerError::NotInitialized`] if no owner was ever recorded
    fn set_price(
        &self,
        arena: &mut StorageArena,
        ctx: &CallContext,
        month: u32,
        day: u32,
        price: Price,
    ) -> Result<PriceWrite, LedgerError> {
        let key = validate(month, day)?;
        let layout = self.layout();
        let owner = arena
            .identity(layout.require("owner")?)?
            .ok_or(LedgerError::NotInitialized)?;

        self.policy().authorize(&WriteRequest {
            caller: &ctx.caller,
            owner: &owner,
            key,
            now: ctx.now,
        })?;

        let previous = store::write(arena, layout.require("prices")?, key, price)?;
        Ok(PriceWrite {
            key,
            price,
            previous,
        })
    }

    /// Stored price, 0 if never set
    ///
    /// # Errors
    /// [`LedgerError::Calendar`] for an invalid key
    fn get_price(&self, arena: &StorageArena, month: u32, day: u32) -> Result<Price, LedgerError> {
        let key = validate(month, day)?;
        Ok(store::read(arena, self.layout().require("prices")?, key)?)
    }

    /// Floor average from one key through another, both included
    ///
    /// # Errors
    /// - [`LedgerError::Calendar`] for the first invalid endpoint, `from` checked first
    /// - [`LedgerError::RangeReversed`] if `to` precedes `from`
    fn average_price(
        &self,
        arena: &StorageArena,
        from: (u32, u32),
        to: (u32, u32),
    ) -> Result<Price, LedgerError> {
        let from = validate(from.0, from.1)?;
        let to = validate(to.0, to.1)?;
        store::average(arena, self.layout().require("prices")?, from, to)
    }
}

/// Revision 1: open writes
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerV1;

impl LedgerLogic for LedgerV1 {
    fn revision(&self) -> Revision {
        Revision::V1
    }

    fn layout(&self) -> &StorageLayout {
        &PRICE_LEDGER_LAYOUT
    }

    fn policy(&self) -> &dyn AccessPolicy {
        &OpenPolicy
    }
}

/// Revision 2: owner-only writes
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerV2;

impl LedgerLogic for LedgerV2 {
    fn revision(&self) -> Revision {
        Revision::V2
    }

    fn layout(&self) -> &StorageLayout {
        &PRICE_LEDGER_LAYOUT
    }

    fn policy(&self) -> &dyn AccessPolicy {
        &OwnerPolicy
    }
}

/// Revision 3: owner-only writes for today's UTC date
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerV3;

impl LedgerLogic for LedgerV3 {
    fn revision(&self) -> Revision {
        Revision::V3
    }

    fn layout(&self) -> &StorageLayout {
        &PRICE_LEDGER_LAYOUT
    }

    fn policy(&self) -> &dyn AccessPolicy {
        &OwnerTodayPolicy
    }
}
