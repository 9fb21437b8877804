// 🔎 Lookup checks - existence and uniqueness against the store
//
// Each check answers Ok(false)/Ok(None) for "absent" and Err for "the store
// could not answer". The workflow treats both as a failed check.

use crate::error::StoreError;
use crate::store::DataStore;
use crate::validators::is_valid_passport;
use rusqlite::params;

pub fn flight_exists(store: &dyn DataStore, flightnum: &str) -> Result<bool, StoreError> {
    let rows = store.query(
        "SELECT flightnum FROM flight WHERE flightnum = ?1",
        params![flightnum],
    )?;
    Ok(!rows.is_empty())
}

/// Known passport; non-10-character input is rejected without a query
pub fn passport_exists(store: &dyn DataStore, passnum: &str) -> Result<bool, StoreError> {
    if !is_valid_passport(passnum) {
        return Ok(false);
    }
    let rows = store.query(
        "SELECT passnum FROM passenger WHERE passnum = ?1",
        params![passnum],
    )?;
    Ok(!rows.is_empty())
}

/// Well-formed passport that no passenger holds yet
pub fn is_passport_unique(store: &dyn DataStore, passnum: &str) -> Result<bool, StoreError> {
    if !is_valid_passport(passnum) {
        return Ok(false);
    }
    Ok(!passport_exists(store, passnum)?)
}

/// Passenger id for a passport. Callers confirm `passport_exists` first.
pub fn resolve_passenger_id(store: &dyn DataStore, passnum: &str) -> Result<Option<i64>, StoreError> {
    let value = store.query_scalar(
        "SELECT pid FROM passenger WHERE passnum = ?1",
        params![passnum],
    )?;
    Ok(value.and_then(|pid| pid.parse().ok()))
}
