//! Upgrade controller: one fixed identity, replaceable logic
//!
//! The proxy owns the storage arena and the event log for its whole
//! lifetime. Logic modules are borrowed behaviour; swapping one is a box
//! swap after the revision and layout checks pass, and the arena is never
//! copied, cleared or relaid.

use crate::api::{ApiVersion, LedgerAdmin, PriceFeed, PriceQuery, LEDGER_API_VERSION};
use crate::clock::{Clock, SystemClock};
use crate::error::{LedgerError, UpgradeError};
use crate::identity::Identity;
use crate::logging::{EventKind, EventLog};
use crate::logic::{CallContext, LedgerLogic, PriceWrite};
use crate::policy::PolicyError;
use crate::revision::{validate_upgrade, Revision};
use crate::storage::{fields, StorageArena, StorageLayout};
use crate::Price;

/// The ledger as seen from outside
pub struct PriceLedgerProxy<C: Clock = SystemClock> {
    arena: StorageArena,
    logic: Option<Box<dyn LedgerLogic>>,
    events: EventLog,
    clock: C,
}

impl PriceLedgerProxy<SystemClock> {
    /// Uninitialized ledger on the wall clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for PriceLedgerProxy<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PriceLedgerProxy<C> {
    /// Uninitialized ledger on a chosen clock
    pub fn with_clock(clock: C) -> Self {
        Self {
            arena: StorageArena::new(),
            logic: None,
            events: EventLog::new(),
            clock,
        }
    }

    pub(crate) fn from_parts(
        arena: StorageArena,
        logic: Option<Box<dyn LedgerLogic>>,
        events: EventLog,
        clock: C,
    ) -> Self {
        Self {
            arena,
            logic,
            events,
            clock,
        }
    }

    /// Installed module, or `NotInitialized`
    fn active(&self) -> Result<&dyn LedgerLogic, LedgerError> {
        self.logic.as_deref().ok_or(LedgerError::NotInitialized)
    }

    /// Owner fixed at initialization
    pub fn owner(&self) -> Result<Identity, LedgerError> {
        let logic = self.active()?;
        self.arena
            .identity(logic.layout().require("owner")?)?
            .ok_or(LedgerError::NotInitialized)
    }

    /// Revision of the installed module; `None` before initialization
    pub fn revision(&self) -> Option<Revision> {
        self.logic.as_ref().map(|l| l.revision())
    }

    /// Layout of the installed module
    pub fn layout(&self) -> Option<&StorageLayout> {
        self.logic.as_ref().map(|l| l.layout())
    }

    /// Entry-point interface version served at this identity
    pub fn api_version(&self) -> ApiVersion {
        LEDGER_API_VERSION
    }

    pub fn is_initialized(&self) -> bool {
        self.logic.is_some()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn arena(&self) -> &StorageArena {
        &self.arena
    }

    /// Move a test clock between operations
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Number of days with an explicitly written price
    pub fn priced_days(&self) -> Result<usize, LedgerError> {
        let logic = self.active()?;
        Ok(crate::store::priced_days(
            &self.arena,
            logic.layout().require("prices")?,
        )?)
    }
}

impl<C: Clock> LedgerAdmin for PriceLedgerProxy<C> {
    fn initialize(&mut self, owner: Identity) -> Result<(), LedgerError> {
        if self.logic.is_some() || self.arena.flag(&fields::INITIALIZED)? {
            tracing::warn!("initialize rejected: already initialized");
            return Err(LedgerError::AlreadyInitialized);
        }

        let module = Revision::V1.module();
        let layout = module.layout();
        layout.validate()?;

        let mut arena = self.arena.clone();
        arena.set_flag(layout.require("initialized")?, true)?;
        arena.set_identity(layout.require("owner")?, owner)?;
        arena.set_stamp(layout);

        self.arena = arena;
        self.logic = Some(module);
        self.events.append(
            self.clock.now(),
            EventKind::Initialized {
                owner,
                revision: Revision::V1,
            },
        );
        tracing::info!(%owner, "ledger initialized at {}", Revision::V1);
        Ok(())
    }

    fn upgrade(
        &mut self,
        caller: &Identity,
        module: Box<dyn LedgerLogic>,
    ) -> Result<Revision, LedgerError> {
        let owner = self.owner()?;
        let current = self.active()?;
        let (from, to) = (current.revision(), module.revision());

        let checked = if *caller != owner {
            Err(LedgerError::Policy(PolicyError::Unauthorized))
        } else {
            validate_upgrade(from, to)
                .and_then(|()| {
                    current
                        .layout()
                        .check_successor(module.layout())
                        .map_err(UpgradeError::from)
                })
                .map_err(LedgerError::from)
        };
        if let Err(e) = checked {
            tracing::warn!(%caller, "upgrade {} -> {} rejected: {}", from, to, e);
            return Err(e);
        }

        self.arena.set_stamp(module.layout());
        self.logic = Some(module);
        self.events
            .append(self.clock.now(), EventKind::Upgraded { from, to });
        tracing::info!("upgraded {} -> {}", from, to);
        Ok(to)
    }
}

impl<C: Clock> PriceFeed for PriceLedgerProxy<C> {
    fn set_price(
        &mut self,
        caller: &Identity,
        month: u32,
        day: u32,
        price: Price,
    ) -> Result<PriceWrite, LedgerError> {
        let logic = self.logic.as_deref().ok_or(LedgerError::NotInitialized)?;
        let ctx = CallContext {
            caller: *caller,
            now: self.clock.now(),
        };
        match logic.set_price(&mut self.arena, &ctx, month, day, price) {
            Ok(write) => {
                self.events.append(
                    ctx.now,
                    EventKind::PriceSet {
                        caller: *caller,
                        key: write.key,
                        price,
                    },
                );
                tracing::info!(%caller, "price for {} set to {}", write.key, price);
                Ok(write)
            }
            Err(e) => {
                tracing::warn!(
                    %caller,
                    month,
                    day,
                    policy = logic.policy().name(),
                    "set_price rejected under {}: {}",
                    logic.revision(),
                    e
                );
                Err(e)
            }
        }
    }
}

impl<C: Clock> PriceQuery for PriceLedgerProxy<C> {
    fn get_price(&self, month: u32, day: u32) -> Result<Price, LedgerError> {
        let price = self.active()?.get_price(&self.arena, month, day)?;
        tracing::debug!(month, day, price, "get_price");
        Ok(price)
    }

    fn average_price_from_to(
        &self,
        from_month: u32,
        from_day: u32,
        to_month: u32,
        to_day: u32,
    ) -> Result<Price, LedgerError> {
        let avg = self.active()?.average_price(
            &self.arena,
            (from_month, from_day),
            (to_month, to_day),
        )?;
        tracing::debug!(from_month, from_day, to_month, to_day, avg, "average_price_from_to");
        Ok(avg)
    }
}

impl<C: Clock> std::fmt::Debug for PriceLedgerProxy<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceLedgerProxy")
            .field("revision", &self.revision())
            .field("stamp", &self.arena.stamp())
            .field("events", &self.events.len())
            .finish_non_exhaustive()
    }
}
