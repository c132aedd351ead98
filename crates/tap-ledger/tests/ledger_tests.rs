use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tap_ledger::prelude::*;
use tap_test_utils::{owner, setup_initialized_ledger, setup_priced_ledger, stranger};

#[test]
fn test_month_times_day_reads() {
    let ledger = setup_priced_ledger();
    assert_eq!(ledger.get_price(1, 1), Ok(1));
    assert_eq!(ledger.get_price(2, 28), Ok(56));
    assert_eq!(ledger.get_price(3, 3), Ok(9));
    assert_eq!(ledger.get_price(4, 10), Ok(40));
    assert_eq!(ledger.get_price(5, 25), Ok(125));
}

#[test]
fn test_averages() {
    let ledger = setup_priced_ledger();
    assert_eq!(ledger.average_price_from_to(1, 1, 1, 2), Ok(1));
    assert_eq!(ledger.average_price_from_to(1, 1, 1, 3), Ok(2));
    assert_eq!(ledger.average_price_from_to(1, 1, 1, 30), Ok(15));
    // across month ends
    assert_eq!(ledger.average_price_from_to(1, 31, 2, 1), Ok(16));
    assert_eq!(ledger.average_price_from_to(2, 28, 3, 2), Ok(21));
}

#[test]
fn test_average_same_day_and_reversed() {
    let ledger = setup_priced_ledger();
    assert_eq!(ledger.average_price_from_to(3, 3, 3, 3), Ok(9));
    assert!(matches!(
        ledger.average_price_from_to(3, 3, 3, 2),
        Err(LedgerError::RangeReversed { .. })
    ));
}

#[test]
fn test_average_endpoint_errors() {
    let ledger = setup_priced_ledger();
    let day = |r: Result<Price, LedgerError>| {
        matches!(r, Err(LedgerError::Calendar(CalendarError::InvalidDay { .. })))
    };
    let month = |r: Result<Price, LedgerError>| {
        matches!(r, Err(LedgerError::Calendar(CalendarError::InvalidMonth { .. })))
    };

    assert!(day(ledger.average_price_from_to(2, 29, 3, 1)));
    assert!(month(ledger.average_price_from_to(12, 29, 13, 1)));
    assert!(month(ledger.average_price_from_to(0, 25, 1, 5)));
    assert!(day(ledger.average_price_from_to(1, 0, 1, 3)));
    assert!(day(ledger.average_price_from_to(5, 30, 5, 33)));
}

#[test]
fn test_get_price_errors() {
    let ledger = setup_initialized_ledger();
    assert_eq!(
        ledger.get_price(2, 29),
        Err(LedgerError::Calendar(CalendarError::InvalidDay { month: 2, day: 29 }))
    );
    assert_eq!(
        ledger.get_price(13, 1),
        Err(LedgerError::Calendar(CalendarError::InvalidMonth { month: 13 }))
    );
    assert_eq!(
        ledger.get_price(0, 0),
        Err(LedgerError::Calendar(CalendarError::InvalidMonth { month: 0 }))
    );
    assert!(ledger.get_price(1, 0).unwrap_err().is_validation());
    assert!(ledger.get_price(5, 33).unwrap_err().is_validation());
}

#[test]
fn test_error_reason_strings() {
    let ledger = setup_initialized_ledger();
    assert_eq!(ledger.get_price(13, 1).unwrap_err().to_string(), "unavailable month");
    assert_eq!(ledger.get_price(4, 31).unwrap_err().to_string(), "unavailable day");
}

#[test]
fn test_unset_reads_zero() {
    let ledger = setup_initialized_ledger();
    assert_eq!(ledger.get_price(12, 31), Ok(0));
    assert_eq!(ledger.average_price_from_to(6, 1, 6, 30), Ok(0));
}

#[test]
fn test_invalid_write_leaves_state_unchanged() {
    let mut ledger = setup_priced_ledger();
    let before = ledger.snapshot();
    assert!(ledger.set_price(&owner(), 2, 29, 1).is_err());
    assert!(ledger.set_price(&owner(), 13, 1, 1).is_err());
    assert_eq!(ledger.snapshot(), before);
}

#[test]
fn test_v1_anyone_writes() {
    let mut ledger = setup_initialized_ledger();
    let write = ledger.set_price(&stranger(), 7, 4, 1776).unwrap();
    assert_eq!(write.previous, None);
    assert_eq!(ledger.get_price(7, 4), Ok(1776));
}

#[test]
fn test_second_initialize_fails_for_any_caller() {
    let mut ledger = setup_priced_ledger();
    let before = ledger.snapshot();
    assert_eq!(ledger.initialize(owner()), Err(LedgerError::AlreadyInitialized));
    assert_eq!(ledger.initialize(stranger()), Err(LedgerError::AlreadyInitialized));
    assert_eq!(ledger.snapshot(), before);
}

proptest! {
    #[test]
    fn prop_write_then_read(month in 1u32..=12, day in 1u32..=31, price: u64) {
        let mut ledger = setup_initialized_ledger();
        let res = ledger.set_price(&owner(), month, day, price);
        if res.is_ok() {
            prop_assert_eq!(ledger.get_price(month, day), Ok(price));
            prop_assert_eq!(ledger.get_price(month, day), ledger.get_price(month, day));
        } else {
            prop_assert!(res.unwrap_err().is_validation());
            prop_assert_eq!(ledger.events().len(), 1);
        }
    }

    #[test]
    fn prop_average_bounded_by_extremes(a in 1u16..=365, b in 1u16..=365) {
        let ledger = setup_priced_ledger();
        let (lo, hi) = (a.min(b), a.max(b));
        let from = CalendarKey::from_ordinal(lo).unwrap();
        let to = CalendarKey::from_ordinal(hi).unwrap();
        let avg = ledger
            .average_price_from_to(
                from.month().into(),
                from.day().into(),
                to.month().into(),
                to.day().into(),
            )
            .unwrap();
        let prices: Vec<Price> = from
            .through(to)
            .map(|k| ledger.get_price(k.month().into(), k.day().into()).unwrap())
            .collect();
        prop_assert!(avg >= *prices.iter().min().unwrap());
        prop_assert!(avg <= *prices.iter().max().unwrap());
    }
}
