//! Testing utilities for TAP workspace
//!
//! Shared identities, ledger setup and the month-times-day price fixture.

#![allow(missing_docs)]

use std::path::PathBuf;
use tap_calendar::DAYS_IN_MONTH;
use tap_ledger::prelude::*;
use tempfile::TempDir;

/// Date every fixture clock starts on
pub const FIXTURE_DATE: (i32, u32, u32) = (2026, 10, 18);

pub fn owner() -> Identity {
    Identity::from_label("owner")
}

pub fn stranger() -> Identity {
    Identity::from_label("stranger")
}

pub fn fixed_clock() -> FixedClock {
    let (y, m, d) = FIXTURE_DATE;
    FixedClock::on_date(y, m, d).unwrap()
}

/// Uninitialized ledger on the fixture clock
pub fn setup_ledger() -> PriceLedgerProxy<FixedClock> {
    PriceLedgerProxy::with_clock(fixed_clock())
}

/// Ledger initialized by [`owner`], running V1
pub fn setup_initialized_ledger() -> PriceLedgerProxy<FixedClock> {
    let mut ledger = setup_ledger();
    ledger.initialize(owner()).unwrap();
    ledger
}

/// Write `month * day` for every day of months `1..=months`
pub fn populate_month_times_day<C: Clock>(ledger: &mut PriceLedgerProxy<C>, months: u32) {
    let writer = owner();
    for month in 1..=months {
        for day in 1..=u32::from(DAYS_IN_MONTH[month as usize - 1]) {
            ledger
                .set_price(&writer, month, day, u64::from(month * day))
                .unwrap();
        }
    }
}

/// V1 ledger holding the month-times-day prices for January to May
pub fn setup_priced_ledger() -> PriceLedgerProxy<FixedClock> {
    let mut ledger = setup_initialized_ledger();
    populate_month_times_day(&mut ledger, 5);
    ledger
}

/// Temporary directory plus a file path inside it
pub fn temp_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}
