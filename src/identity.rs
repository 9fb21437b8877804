// 🪪 Identity generation - surrogate keys and booking references
//
// Neither key is reserved: another session may compute the same value before
// our insert commits. Single-session use only; a multi-session deployment
// needs a serializable transaction or a database sequence around this.

use crate::error::IdentityError;
use crate::retry::RetryPolicy;
use crate::store::DataStore;
use rand::Rng;
use rusqlite::params;
use tracing::debug;

pub const BOOKING_REF_LEN: usize = 10;

/// First id handed out when the table is empty
pub const FIRST_ID: i64 = 1;

// ============================================================================
// SURROGATE KEYS
// ============================================================================

/// Tables whose integer key is `max(key) + 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurrogateKey {
    Passenger,
    Rating,
}

impl SurrogateKey {
    pub fn table(&self) -> &'static str {
        match self {
            SurrogateKey::Passenger => "passenger",
            SurrogateKey::Rating => "ratings",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SurrogateKey::Passenger => "pid",
            SurrogateKey::Rating => "rid",
        }
    }

    fn max_query(&self) -> &'static str {
        match self {
            SurrogateKey::Passenger => "SELECT MAX(pid) FROM passenger",
            SurrogateKey::Rating => "SELECT MAX(rid) FROM ratings",
        }
    }
}

/// Re-reads the current maximum every call; two calls without an insert
/// in between return the same id.
pub fn next_id(store: &dyn DataStore, key: SurrogateKey) -> Result<i64, IdentityError> {
    let id = match store.query_scalar(key.max_query(), &[])? {
        None => FIRST_ID,
        Some(value) => {
            let max: i64 = value.trim().parse().map_err(|_| IdentityError::MalformedKey {
                table: key.table(),
                column: key.column(),
                value: value.clone(),
            })?;
            max.checked_add(1).ok_or(IdentityError::KeysExhausted {
                table: key.table(),
                column: key.column(),
            })?
        }
    };

    debug!(table = key.table(), id, "next surrogate id");
    Ok(id)
}

// ============================================================================
// BOOKING REFERENCES
// ============================================================================

/// One reference character: an uppercase letter, replaced by a digit
/// whenever the letter's code is even.
fn reference_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    let code = rng.gen_range(b'A'..=b'Z');
    if code % 2 == 0 {
        char::from(rng.gen_range(b'0'..=b'9'))
    } else {
        char::from(code)
    }
}

pub fn candidate_reference<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..BOOKING_REF_LEN).map(|_| reference_char(rng)).collect()
}

pub fn reference_exists(store: &dyn DataStore, reference: &str) -> Result<bool, IdentityError> {
    let rows = store.query(
        "SELECT bookref FROM booking WHERE bookref = ?1",
        params![reference],
    )?;
    Ok(!rows.is_empty())
}

/// Draw references until one is not in the booking table.
pub fn generate_booking_reference<R: Rng + ?Sized>(
    store: &dyn DataStore,
    rng: &mut R,
    policy: RetryPolicy,
) -> Result<String, IdentityError> {
    let mut attempts = 0;
    loop {
        let candidate = candidate_reference(rng);
        attempts += 1;

        if !reference_exists(store, &candidate)? {
            debug!(reference = %candidate, attempts, "booking reference generated");
            return Ok(candidate);
        }

        debug!(reference = %candidate, "booking reference collision");
        if policy.exhausted(attempts) {
            return Err(IdentityError::ReferencesExhausted(attempts));
        }
    }
}
