//! Error taxonomy for the booking client.
//!
//! Field-level problems ([`Rejection`]) are recoverable by re-prompting.
//! Everything else aborts the current operation back to the menu.

use thiserror::Error;

/// A DataStore round-trip failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A mutating statement was rejected (malformed SQL, constraint violation)
    #[error("statement failed: {0}")]
    Statement(#[source] rusqlite::Error),

    /// A read query failed
    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),
}

impl StoreError {
    /// True when the statement hit a UNIQUE/CHECK/FOREIGN KEY constraint
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            StoreError::Statement(rusqlite::Error::SqliteFailure(err, _))
            | StoreError::Query(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == rusqlite::ErrorCode::ConstraintViolation
            }
            _ => false,
        }
    }

    /// True when the row clashed with an existing PRIMARY KEY or UNIQUE value
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::Statement(rusqlite::Error::SqliteFailure(err, _))
            | StoreError::Query(rusqlite::Error::SqliteFailure(err, _)) => matches!(
                err.extended_code,
                rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            ),
            _ => false,
        }
    }
}

/// Why a single answer to a prompt was refused.
#[derive(Debug, Error)]
pub enum Rejection {
    /// Input has the wrong shape
    #[error("{0}")]
    Invalid(String),

    /// The referenced flight or passenger does not exist
    #[error("{0}")]
    NotFound(String),

    /// The value is already taken by another record
    #[error("{0}")]
    Taken(String),

    /// The lookup could not be answered; treated as a failed check
    #[error("could not verify {what}: {source}")]
    Unverified {
        what: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Deriving a surrogate key or booking reference failed.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("max({column}) over {table} is not an integer: {value:?}")]
    MalformedKey {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("max({column}) over {table} is already the largest key")]
    KeysExhausted {
        table: &'static str,
        column: &'static str,
    },

    #[error("no unused booking reference after {0} attempts")]
    ReferencesExhausted(u32),
}

/// An interactive operation was aborted.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("no acceptable {field} after {attempts} attempts")]
    AttemptsExhausted { field: &'static str, attempts: u32 },

    #[error("input closed")]
    InputClosed,

    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Passport passed the existence check but no passenger id came back
    #[error("no passenger id found for passport {0}")]
    PassengerNotResolved(String),

    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_detected() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (k TEXT PRIMARY KEY)", []).unwrap();
        conn.execute("INSERT INTO t VALUES ('a')", []).unwrap();

        let err = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .map_err(StoreError::Statement)
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert!(err.is_unique_violation());

        let err = StoreError::Query(rusqlite::Error::InvalidQuery);
        assert!(!err.is_constraint_violation());
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_check_violation_is_not_unique() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE t (n INTEGER CHECK (n < 10))", []).unwrap();

        let err = conn
            .execute("INSERT INTO t VALUES (99)", [])
            .map_err(StoreError::Statement)
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_rejection_messages() {
        let rejection = Rejection::Unverified {
            what: "flight",
            source: StoreError::Query(rusqlite::Error::InvalidQuery),
        };
        assert!(rejection.to_string().starts_with("could not verify flight"));
        assert_eq!(Rejection::Taken("in use".into()).to_string(), "in use");
    }
}
