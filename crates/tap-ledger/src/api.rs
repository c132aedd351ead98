//! Entry points exposed at the ledger's fixed identity
//!
//! The submitting identity is always passed explicitly; nothing here reads
//! it from ambient state.

use crate::error::LedgerError;
use crate::identity::Identity;
use crate::logic::{LedgerLogic, PriceWrite};
use crate::revision::Revision;
use crate::Price;

/// Interface version of the entry points below
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

pub const LEDGER_API_VERSION: ApiVersion = ApiVersion {
    major: 1,
    minor: 0,
    patch: 0,
};

impl ApiVersion {
    /// Check if a client built against `self` can call `served`
    ///
    /// Same major, and `served` is at least as new.
    pub fn is_served_by(&self, served: &ApiVersion) -> bool {
        self.major == served.major
            && (served.minor, served.patch) >= (self.minor, self.patch)
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// One-time setup and logic replacement
pub trait LedgerAdmin {
    /// Record `owner` and mark the ledger initialized
    fn initialize(&mut self, owner: Identity) -> Result<(), LedgerError>;

    /// Replace the installed logic module, keeping storage as is
    fn upgrade(&mut self, caller: &Identity, module: Box<dyn LedgerLogic>)
        -> Result<Revision, LedgerError>;
}

/// Price writes, authorized by the installed revision
pub trait PriceFeed {
    fn set_price(
        &mut self,
        caller: &Identity,
        month: u32,
        day: u32,
        price: Price,
    ) -> Result<PriceWrite, LedgerError>;
}

/// Unauthenticated reads
pub trait PriceQuery {
    fn get_price(&self, month: u32, day: u32) -> Result<Price, LedgerError>;

    /// Floor average over every day from the first key through the second
    fn average_price_from_to(
        &self,
        from_month: u32,
        from_day: u32,
        to_month: u32,
        to_day: u32,
    ) -> Result<Price, LedgerError>;
}
