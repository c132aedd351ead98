use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tap_ledger::prelude::*;
use tap_ledger::revision::{allowed_upgrades, validate_upgrade};
use tap_ledger::storage::{fields, FieldKind, FieldSpec, StorageLayout};
use tap_ledger::{AccessPolicy, EventKind, LedgerLogic, OwnerPolicy, UpgradeError};
use tap_test_utils::{owner, setup_initialized_ledger, setup_priced_ledger, stranger};

fn all_prices<C: Clock>(ledger: &PriceLedgerProxy<C>) -> Vec<Price> {
    CalendarKey::FIRST
        .through(CalendarKey::LAST)
        .map(|k| ledger.get_price(k.month().into(), k.day().into()).unwrap())
        .collect()
}

#[test]
fn test_upgrade_preserves_prices_and_owner() {
    let mut ledger = setup_priced_ledger();
    let before = all_prices(&ledger);

    assert_eq!(ledger.upgrade(&owner(), Revision::V2.module()), Ok(Revision::V2));
    assert_eq!(all_prices(&ledger), before);
    assert_eq!(ledger.owner(), Ok(owner()));

    assert_eq!(ledger.upgrade(&owner(), Revision::V3.module()), Ok(Revision::V3));
    assert_eq!(all_prices(&ledger), before);
    assert_eq!(ledger.owner(), Ok(owner()));
    assert_eq!(ledger.average_price_from_to(1, 1, 1, 30), Ok(15));
}

#[test]
fn test_v2_owner_only() {
    let mut ledger = setup_initialized_ledger();
    ledger.upgrade(&owner(), Revision::V2.module()).unwrap();

    ledger.set_price(&owner(), 6, 15, 100).unwrap();
    assert_eq!(ledger.get_price(6, 15), Ok(100));

    let err = ledger.set_price(&stranger(), 6, 15, 1).unwrap_err();
    assert_eq!(err, LedgerError::Policy(PolicyError::Unauthorized));
    assert_eq!(err.to_string(), "caller is not the owner");
    assert_eq!(ledger.get_price(6, 15), Ok(100));
}

#[test]
fn test_v2_validation_before_authorization() {
    let mut ledger = setup_initialized_ledger();
    ledger.upgrade(&owner(), Revision::V2.module()).unwrap();
    let err = ledger.set_price(&stranger(), 13, 1, 1).unwrap_err();
    assert!(err.is_validation());
    assert!(!err.is_authorization());
}

#[test]
fn test_v3_today_only() {
    let mut ledger = setup_priced_ledger();
    ledger.upgrade(&owner(), Revision::V3.module()).unwrap();

    // fixture clock sits on October 18th
    ledger.set_price(&owner(), 10, 18, 77).unwrap();
    assert_eq!(ledger.get_price(10, 18), Ok(77));

    let err = ledger.set_price(&owner(), 3, 3, 1000).unwrap_err();
    assert!(matches!(err, LedgerError::Policy(PolicyError::NotTodaysDate { .. })));
    assert_eq!(err.to_string(), "only today's price may be set");
    assert_eq!(ledger.get_price(3, 3), Ok(9));

    assert_eq!(
        ledger.set_price(&stranger(), 10, 18, 1),
        Err(LedgerError::Policy(PolicyError::Unauthorized))
    );
    assert_eq!(ledger.get_price(10, 18), Ok(77));
}

#[test]
fn test_v3_follows_the_clock() {
    let mut ledger = setup_initialized_ledger();
    ledger.upgrade(&owner(), Revision::V3.module()).unwrap();

    // late on the 18th is still the 18th in UTC
    ledger
        .clock_mut()
        .set(Utc.with_ymd_and_hms(2026, 10, 18, 23, 59, 59).unwrap());
    assert!(ledger.set_price(&owner(), 10, 18, 1).is_ok());
    assert!(ledger.set_price(&owner(), 10, 19, 1).is_err());

    ledger
        .clock_mut()
        .set(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
    assert!(ledger.set_price(&owner(), 10, 19, 2).is_ok());
    assert_eq!(ledger.get_price(10, 19), Ok(2));
}

#[test]
fn test_v3_leap_day_denies_all_writes() {
    let mut ledger = setup_initialized_ledger();
    ledger.upgrade(&owner(), Revision::V3.module()).unwrap();
    ledger
        .clock_mut()
        .set(Utc.with_ymd_and_hms(2028, 2, 29, 12, 0, 0).unwrap());

    assert!(ledger.set_price(&owner(), 2, 28, 1).unwrap_err().is_authorization());
    assert!(ledger.set_price(&owner(), 3, 1, 1).unwrap_err().is_authorization());
    assert!(ledger.set_price(&owner(), 2, 29, 1).unwrap_err().is_validation());
}

#[test]
fn test_skip_to_v3_allowed() {
    let mut ledger = setup_initialized_ledger();
    assert_eq!(ledger.upgrade(&owner(), Revision::V3.module()), Ok(Revision::V3));
}

#[test]
fn test_downgrade_and_reinstall_rejected() {
    let mut ledger = setup_priced_ledger();
    ledger.upgrade(&owner(), Revision::V3.module()).unwrap();
    let before = ledger.snapshot();

    assert_eq!(
        ledger.upgrade(&owner(), Revision::V1.module()),
        Err(LedgerError::Upgrade(UpgradeError::NotForward {
            from: Revision::V3,
            to: Revision::V1,
        }))
    );
    assert!(ledger.upgrade(&owner(), Revision::V3.module()).is_err());
    assert_eq!(ledger.snapshot(), before);
}

#[test]
fn test_non_owner_upgrade_rejected() {
    let mut ledger = setup_priced_ledger();
    let before = ledger.snapshot();
    assert_eq!(
        ledger.upgrade(&stranger(), Revision::V2.module()),
        Err(LedgerError::Policy(PolicyError::Unauthorized))
    );
    assert_eq!(ledger.snapshot(), before);
    assert_eq!(ledger.revision(), Some(Revision::V1));
}

#[derive(Debug)]
struct AppendedV2;

static APPENDED: StorageLayout = StorageLayout {
    name: "price-ledger",
    version: 2,
    fields: &[
        fields::INITIALIZED,
        fields::OWNER,
        fields::PRICES,
        FieldSpec::new(3, "paused", FieldKind::Flag),
    ],
};

impl LedgerLogic for AppendedV2 {
    fn revision(&self) -> Revision {
        Revision::V2
    }

    fn layout(&self) -> &StorageLayout {
        &APPENDED
    }

    fn policy(&self) -> &dyn AccessPolicy {
        &OwnerPolicy
    }
}

#[derive(Debug)]
struct RetypedV2;

static RETYPED: StorageLayout = StorageLayout {
    name: "price-ledger",
    version: 2,
    fields: &[
        fields::INITIALIZED,
        FieldSpec::new(1, "owner", FieldKind::Flag),
        fields::PRICES,
    ],
};

impl LedgerLogic for RetypedV2 {
    fn revision(&self) -> Revision {
        Revision::V2
    }

    fn layout(&self) -> &StorageLayout {
        &RETYPED
    }

    fn policy(&self) -> &dyn AccessPolicy {
        &OwnerPolicy
    }
}

#[test]
fn test_append_only_module_accepted() {
    let mut ledger = setup_priced_ledger();
    ledger.upgrade(&owner(), Box::new(AppendedV2)).unwrap();
    assert_eq!(ledger.layout().map(|l| l.version), Some(2));
    assert_eq!(ledger.arena().stamp(), Some(APPENDED.stamp()));
    assert_eq!(ledger.get_price(5, 25), Ok(125));
    assert_eq!(ledger.owner(), Ok(owner()));
}

#[test]
fn test_retyped_module_rejected() {
    let mut ledger = setup_priced_ledger();
    let before = ledger.snapshot();
    let err = ledger.upgrade(&owner(), Box::new(RetypedV2)).unwrap_err();
    assert!(matches!(err, LedgerError::Upgrade(UpgradeError::Layout(_))));
    assert_eq!(ledger.snapshot(), before);
}

#[test]
fn test_event_chain_records_history() {
    let mut ledger = setup_initialized_ledger();
    ledger.set_price(&stranger(), 1, 1, 5).unwrap();
    ledger.upgrade(&owner(), Revision::V2.module()).unwrap();
    let _ = ledger.set_price(&stranger(), 1, 1, 6);

    let log = ledger.events();
    assert!(log.verify_integrity().is_ok());
    assert_eq!(log.len(), 3);
    assert_eq!(
        log.events()[2].kind,
        EventKind::Upgraded {
            from: Revision::V1,
            to: Revision::V2
        }
    );
}

#[test]
fn test_allowed_upgrades() {
    assert_eq!(allowed_upgrades(Revision::V1), vec![Revision::V2, Revision::V3]);
    assert_eq!(allowed_upgrades(Revision::V2), vec![Revision::V3]);
    assert!(allowed_upgrades(Revision::V3).is_empty());
}

proptest! {
    #[test]
    fn prop_upgrade_result_matches_state_machine(
        path in prop::collection::vec(
            prop_oneof![Just(Revision::V1), Just(Revision::V2), Just(Revision::V3)],
            0..6,
        )
    ) {
        let mut ledger = setup_priced_ledger();
        let prices = all_prices(&ledger);
        for target in path {
            let from = ledger.revision().unwrap();
            let res = ledger.upgrade(&owner(), target.module());
            prop_assert_eq!(res.is_ok(), validate_upgrade(from, target).is_ok());
        }
        prop_assert_eq!(all_prices(&ledger), prices);
        prop_assert_eq!(ledger.owner(), Ok(owner()));
    }
}
