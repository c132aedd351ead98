//! TAP Ledger
//!
//! A daily price ledger served through one fixed identity whose logic can be
//! replaced while the stored prices and the owner survive untouched.
//!
//! # Layers
//!
//! 1. **Storage arena** ([`storage`]): the stable region addressed by slot,
//!    described by a versioned [`StorageLayout`]
//! 2. **Logic modules** ([`logic`]): stateless revisions V1, V2, V3 that
//!    validate keys, consult their [`AccessPolicy`] and touch the arena
//! 3. **Upgrade controller** ([`proxy`]): owns the arena, forwards calls to
//!    the installed module and swaps modules after a layout check
//!
//! # Quick Start
//!
//! ```rust
//! use tap_ledger::prelude::*;
//!
//! let owner = Identity::from_label("owner");
//! let mut ledger = PriceLedgerProxy::with_clock(FixedClock::on_date(2026, 10, 18).unwrap());
//!
//! ledger.initialize(owner).unwrap();
//! ledger.set_price(&owner, 10, 18, 100).unwrap();
//! ledger.upgrade(&owner, Revision::V3.module()).unwrap();
//!
//! assert_eq!(ledger.get_price(10, 18).unwrap(), 100);
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod logic;
pub mod policy;
pub mod proxy;
pub mod revision;
pub mod snapshot;
pub mod storage;
pub mod store;

// Re-exports
pub use api::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ClockConfig, LedgerConfig};
pub use error::*;
pub use identity::{Identity, IdentityError};
pub use logging::{Event, EventKind, EventLog};
pub use logic::{CallContext, LedgerLogic, LedgerV1, LedgerV2, LedgerV3, PriceWrite};
pub use policy::{AccessPolicy, OpenPolicy, OwnerPolicy, OwnerTodayPolicy, PolicyError, WriteRequest};
pub use proxy::PriceLedgerProxy;
pub use revision::Revision;
pub use snapshot::{ProxySnapshot, SnapshotError};
pub use storage::{StorageArena, StorageLayout};
pub use tap_calendar::{validate, CalendarError, CalendarKey};

/// Stored price value
pub type Price = u64;

/// Common imports for driving a ledger
pub mod prelude {
    pub use crate::api::{LedgerAdmin, PriceFeed, PriceQuery};
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::error::LedgerError;
    pub use crate::identity::Identity;
    pub use crate::policy::PolicyError;
    pub use crate::proxy::PriceLedgerProxy;
    pub use crate::revision::Revision;
    pub use crate::Price;
    pub use tap_calendar::{CalendarError, CalendarKey};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
