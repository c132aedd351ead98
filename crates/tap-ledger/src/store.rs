//! Price ledger operations over the arena
//!
//! Keys arrive as [`CalendarKey`], so they already passed calendar
//! validation. Days never written read as price 0.

use crate::error::LedgerError;
use crate::storage::{FieldSpec, StorageArena, StorageError};
use crate::Price;
use tap_calendar::CalendarKey;

/// Stored price for `key`, 0 if never set
///
/// # Errors
/// [`StorageError`] if `prices` is not a price-map field
pub fn read(arena: &StorageArena, prices: &FieldSpec, key: CalendarKey) -> Result<Price, StorageError> {
    Ok(arena
        .prices(prices)?
        .and_then(|map| map.get(&key).copied())
        .unwrap_or(0))
}

/// Insert or overwrite the price for `key`
///
/// # Errors
/// [`StorageError`] if `prices` is not a price-map field
pub fn write(
    arena: &mut StorageArena,
    prices: &FieldSpec,
    key: CalendarKey,
    price: Price,
) -> Result<Option<Price>, StorageError> {
    Ok(arena.prices_mut(prices)?.insert(key, price))
}

/// Floor average over every day from `from` through `to`, both included
///
/// # Errors
/// - [`LedgerError::RangeReversed`] if `to` precedes `from`
/// - [`LedgerError::Storage`] if `prices` is not a price-map field
pub fn average(
    arena: &StorageArena,
    prices: &FieldSpec,
    from: CalendarKey,
    to: CalendarKey,
) -> Result<Price, LedgerError> {
    if to < from {
        return Err(LedgerError::RangeReversed { from, to });
    }
    let map = arena.prices(prices)?;
    let days = from.through(to);
    let count = u128::from(days.day_count());
    let sum: u128 = days
        .map(|key| map.and_then(|m| m.get(&key)).copied().map_or(0, u128::from))
        .sum();
    // mean of u64 values fits in u64
    #[allow(clippy::cast_possible_truncation)]
    let mean = (sum / count) as Price;
    Ok(mean)
}

/// Number of keys ever written
///
/// # Errors
/// [`StorageError`] if `prices` is not a price-map field
pub fn priced_days(arena: &StorageArena, prices: &FieldSpec) -> Result<usize, StorageError> {
    Ok(arena.prices(prices)?.map_or(0, |m| m.len()))
}
