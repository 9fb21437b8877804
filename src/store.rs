use crate::error::StoreError;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, ToSql};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

// ============================================================================
// DATASTORE CONTRACT
// ============================================================================

/// Rows returned by a query, fields rendered as strings in SELECT order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// First field of the first row, if any
    pub fn first_value(&self) -> Option<&str> {
        self.rows.first().and_then(|row| row.first()).map(String::as_str)
    }
}

/// The external relational store the client talks to.
///
/// One statement in flight at a time; every call blocks until the store
/// answers or its configured timeout elapses.
pub trait DataStore {
    /// Run a mutating statement, returning the number of affected rows
    fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize, StoreError>;

    /// Run a read query
    fn query(&self, sql: &str, params: &[&dyn ToSql]) -> Result<ResultSet, StoreError>;

    /// First column of the first row; `None` on no rows or NULL
    fn query_scalar(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Option<String>, StoreError>;
}

// ============================================================================
// SQLITE STORE
// ============================================================================

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a file-backed database in WAL mode with the schema in place
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(StoreError::Statement)?;
        // Enable WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(StoreError::Statement)?;
        Self::from_connection(conn, busy_timeout)
    }

    /// Fresh in-memory database, used by tests and demos
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Statement)?;
        Self::from_connection(conn, DEFAULT_BUSY_TIMEOUT)
    }

    fn from_connection(conn: Connection, busy_timeout: Duration) -> Result<Self, StoreError> {
        conn.busy_timeout(busy_timeout).map_err(StoreError::Statement)?;
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(StoreError::Statement)?;
        setup_database(&conn).map_err(StoreError::Statement)?;
        Ok(SqliteStore { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl DataStore for SqliteStore {
    fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize, StoreError> {
        debug!(sql, "execute");
        self.conn.execute(sql, params).map_err(StoreError::Statement)
    }

    fn query(&self, sql: &str, params: &[&dyn ToSql]) -> Result<ResultSet, StoreError> {
        debug!(sql, "query");
        let mut stmt = self.conn.prepare(sql).map_err(StoreError::Query)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query(params).map_err(StoreError::Query)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(StoreError::Query)? {
            let mut fields = Vec::with_capacity(width);
            for i in 0..width {
                let value = row.get_ref(i).map_err(StoreError::Query)?;
                fields.push(render_value(value));
            }
            out.push(fields);
        }

        Ok(ResultSet { columns, rows: out })
    }

    fn query_scalar(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Option<String>, StoreError> {
        debug!(sql, "query_scalar");
        let mut stmt = self.conn.prepare(sql).map_err(StoreError::Query)?;
        let mut rows = stmt.query(params).map_err(StoreError::Query)?;
        match rows.next().map_err(StoreError::Query)? {
            Some(row) => match row.get_ref(0).map_err(StoreError::Query)? {
                ValueRef::Null => Ok(None),
                value => Ok(Some(render_value(value))),
            },
            None => Ok(None),
        }
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "null".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => b.iter().map(|byte| format!("{:02x}", byte)).collect(),
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS airline (
            airid INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            founded INTEGER NOT NULL,
            country TEXT NOT NULL,
            hub TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS flight (
            airid INTEGER NOT NULL REFERENCES airline(airid),
            flightnum TEXT PRIMARY KEY,
            origin TEXT NOT NULL,
            destination TEXT NOT NULL,
            plane TEXT NOT NULL,
            seats INTEGER NOT NULL CHECK (seats > 0 AND seats < 500),
            duration INTEGER NOT NULL CHECK (duration > 0 AND duration < 24)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS passenger (
            pid INTEGER PRIMARY KEY,
            passnum TEXT NOT NULL UNIQUE,
            fullname TEXT NOT NULL,
            bdate TEXT NOT NULL,
            country TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS booking (
            bookref TEXT PRIMARY KEY,
            departure TEXT NOT NULL,
            flightnum TEXT NOT NULL REFERENCES flight(flightnum),
            pid INTEGER NOT NULL REFERENCES passenger(pid)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ratings (
            rid INTEGER PRIMARY KEY,
            pid INTEGER NOT NULL REFERENCES passenger(pid),
            flightnum TEXT NOT NULL REFERENCES flight(flightnum),
            score INTEGER NOT NULL CHECK (score >= 0 AND score <= 5),
            comment TEXT
        )",
        [],
    )?;

    // Audit trail
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_booking_flight_date ON booking(flightnum, departure)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_flight_route ON flight(origin, destination)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

/// Stand-in stores shared by the unit tests
#[cfg(test)]
pub(crate) mod testing {
    use super::{DataStore, ResultSet};
    use crate::error::StoreError;
    use rusqlite::ToSql;
    use std::cell::Cell;

    fn query_failure() -> StoreError {
        StoreError::Query(rusqlite::Error::InvalidQuery)
    }

    /// Fixed answers for every read; counts how many reads it served
    pub(crate) struct FakeStore {
        answer: Option<String>,
        reachable: bool,
        pub(crate) queries: Cell<usize>,
    }

    impl FakeStore {
        /// No rows for any query
        pub(crate) fn empty() -> Self {
            FakeStore { answer: None, reachable: true, queries: Cell::new(0) }
        }

        /// One row holding `value` for every query and scalar
        pub(crate) fn answering(value: &str) -> Self {
            FakeStore { answer: Some(value.to_string()), reachable: true, queries: Cell::new(0) }
        }

        /// Every call fails
        pub(crate) fn unreachable() -> Self {
            FakeStore { answer: None, reachable: false, queries: Cell::new(0) }
        }

        fn read(&self) -> Result<Option<String>, StoreError> {
            self.queries.set(self.queries.get() + 1);
            if !self.reachable {
                return Err(query_failure());
            }
            Ok(self.answer.clone())
        }
    }

    impl DataStore for FakeStore {
        fn execute(&self, _sql: &str, _params: &[&dyn ToSql]) -> Result<usize, StoreError> {
            if !self.reachable {
                return Err(StoreError::Statement(rusqlite::Error::InvalidQuery));
            }
            Ok(0)
        }

        fn query(&self, _sql: &str, _params: &[&dyn ToSql]) -> Result<ResultSet, StoreError> {
            let rows = self.read()?.map(|value| vec![value]).into_iter().collect();
            Ok(ResultSet { columns: vec!["value".to_string()], rows })
        }

        fn query_scalar(&self, _sql: &str, _params: &[&dyn ToSql]) -> Result<Option<String>, StoreError> {
            self.read()
        }
    }

    /// A real store with selected reads failing
    pub(crate) struct FaultyStore<S> {
        inner: S,
        failing_queries: Option<&'static str>,
        failing_scalars: bool,
    }

    impl<S: DataStore> FaultyStore<S> {
        pub(crate) fn new(inner: S) -> Self {
            FaultyStore { inner, failing_queries: None, failing_scalars: false }
        }

        /// `query` fails whenever the SQL contains `fragment`
        pub(crate) fn fail_queries_on(mut self, fragment: &'static str) -> Self {
            self.failing_queries = Some(fragment);
            self
        }

        /// Every `query_scalar` fails
        pub(crate) fn fail_scalars(mut self) -> Self {
            self.failing_scalars = true;
            self
        }

        pub(crate) fn inner(&self) -> &S {
            &self.inner
        }
    }

    impl<S: DataStore> DataStore for FaultyStore<S> {
        fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize, StoreError> {
            self.inner.execute(sql, params)
        }

        fn query(&self, sql: &str, params: &[&dyn ToSql]) -> Result<ResultSet, StoreError> {
            if self.failing_queries.is_some_and(|fragment| sql.contains(fragment)) {
                return Err(query_failure());
            }
            self.inner.query(sql, params)
        }

        fn query_scalar(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Option<String>, StoreError> {
            if self.failing_scalars {
                return Err(query_failure());
            }
            self.inner.query_scalar(sql, params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .execute(
                "INSERT INTO airline (airid, name, founded, country, hub) VALUES (1, 'Aero', 1990, 'USA', 'LAX')",
                &[],
            )
            .unwrap();
        store
            .execute(
                "INSERT INTO flight (airid, flightnum, origin, destination, plane, seats, duration)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![1, "AE100", "Los Angeles", "Tokyo", "A350", 300, 11],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_query_returns_columns_in_select_order() {
        let store = seeded();
        let result = store
            .query(
                "SELECT flightnum, seats, origin FROM flight WHERE flightnum = ?1",
                params!["AE100"],
            )
            .unwrap();

        assert_eq!(result.columns, vec!["flightnum", "seats", "origin"]);
        assert_eq!(result.rows, vec![vec!["AE100", "300", "Los Angeles"]]);
        assert_eq!(result.first_value(), Some("AE100"));
    }

    #[test]
    fn test_query_scalar_null_and_empty() {
        let store = seeded();

        let max = store.query_scalar("SELECT MAX(pid) FROM passenger", &[]).unwrap();
        assert_eq!(max, None);

        let none = store
            .query_scalar("SELECT seats FROM flight WHERE flightnum = ?1", params!["NOPE"])
            .unwrap();
        assert_eq!(none, None);

        let seats = store
            .query_scalar("SELECT seats FROM flight WHERE flightnum = ?1", params!["AE100"])
            .unwrap();
        assert_eq!(seats.as_deref(), Some("300"));
    }

    #[test]
    fn test_malformed_sql_is_store_error() {
        let store = seeded();
        assert!(matches!(store.query("SELEC nothing", &[]), Err(StoreError::Query(_))));
        assert!(matches!(store.execute("INSER nothing", &[]), Err(StoreError::Statement(_))));
    }

    #[test]
    fn test_schema_checks_enforced() {
        let store = seeded();

        let err = store
            .execute(
                "INSERT INTO flight (airid, flightnum, origin, destination, plane, seats, duration)
                 VALUES (1, 'AE101', 'A', 'B', 'P', 600, 2)",
                &[],
            )
            .unwrap_err();
        assert!(err.is_constraint_violation());

        // Unknown flight referenced by a booking
        store
            .execute(
                "INSERT INTO passenger (pid, passnum, fullname, bdate, country)
                 VALUES (1, 'AB12345678', 'Ann', '1990-01-01', 'USA')",
                &[],
            )
            .unwrap();
        let err = store
            .execute(
                "INSERT INTO booking (bookref, departure, flightnum, pid)
                 VALUES ('A1C3E5G7I9', '2024-01-01', 'ZZ999', 1)",
                &[],
            )
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_file_store_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("air.db");

        {
            let store = SqliteStore::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
            store
                .execute(
                    "INSERT INTO airline (airid, name, founded, country, hub) VALUES (7, 'Sky', 2001, 'UK', 'LHR')",
                    &[],
                )
                .unwrap();
        }

        let store = SqliteStore::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap();
        let name = store
            .query_scalar("SELECT name FROM airline WHERE airid = ?1", params![7])
            .unwrap();
        assert_eq!(name.as_deref(), Some("Sky"));
    }
}
