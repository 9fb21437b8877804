// 📥 CSV seeding - load reference data and history into an empty schema
//
// Files are read in foreign-key order. Each row is shape-checked with the
// same validators the console uses before it reaches the store.

use crate::error::StoreError;
use crate::models::{Airline, Booking, Flight, Passenger, Rating};
use crate::records::{insert_airline, insert_booking, insert_flight, insert_passenger, insert_rating};
use crate::store::DataStore;
use crate::validators::normalize_date;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

pub const IMPORT_ACTOR: &str = "csv_importer";

pub const AIRLINE_FILE: &str = "airline.csv";
pub const FLIGHT_FILE: &str = "flights.csv";
pub const PASSENGER_FILE: &str = "passenger.csv";
pub const BOOKING_FILE: &str = "bookings.csv";
pub const RATING_FILE: &str = "ratings.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub table: &'static str,
    pub inserted: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub missing_file: bool,
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.missing_file {
            return write!(f, "{}: no file, skipped", self.table);
        }
        write!(
            f,
            "{}: {} inserted, {} duplicates, {} invalid",
            self.table, self.inserted, self.duplicates, self.invalid
        )
    }
}

pub fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let row: T = result.with_context(|| format!("Failed to deserialize {:?} row {}", path, line + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

fn import_table<T, V, I>(
    store: &dyn DataStore,
    dir: &Path,
    file: &str,
    table: &'static str,
    mut prepare: V,
    insert: I,
) -> Result<TableSummary>
where
    T: DeserializeOwned,
    V: FnMut(T) -> Option<T>,
    I: Fn(&dyn DataStore, &T) -> Result<(), StoreError>,
{
    let mut summary = TableSummary {
        table,
        ..TableSummary::default()
    };

    let path = dir.join(file);
    if !path.exists() {
        warn!(file = %path.display(), "seed file not found, skipping");
        summary.missing_file = true;
        return Ok(summary);
    }

    for row in load_csv::<T>(&path)? {
        let Some(row) = prepare(row) else {
            summary.invalid += 1;
            continue;
        };

        match insert(store, &row) {
            Ok(()) => summary.inserted += 1,
            Err(err) if err.is_unique_violation() => {
                debug!(table, error = %err, "duplicate row skipped");
                summary.duplicates += 1;
            }
            Err(err) if err.is_constraint_violation() => {
                debug!(table, error = %err, "row rejected by constraint");
                summary.invalid += 1;
            }
            Err(err) => {
                return Err(anyhow::Error::new(err).context(format!("Failed to insert into {}", table)));
            }
        }
    }

    info!(
        table,
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        invalid = summary.invalid,
        "table imported"
    );
    Ok(summary)
}

/// Load every seed file found in `dir`
pub fn import_directory(store: &dyn DataStore, dir: &Path) -> Result<Vec<TableSummary>> {
    if !dir.is_dir() {
        anyhow::bail!("Seed directory not found: {:?}", dir);
    }

    let airlines = import_table(store, dir, AIRLINE_FILE, "airline", Some, |store, row: &Airline| {
        insert_airline(store, row)
    })?;

    let flights = import_table(
        store,
        dir,
        FLIGHT_FILE,
        "flight",
        |row: Flight| row.validate().ok().map(|_| row),
        |store, row: &Flight| insert_flight(store, row),
    )?;

    let passengers = import_table(
        store,
        dir,
        PASSENGER_FILE,
        "passenger",
        |mut row: Passenger| {
            row.validate().ok()?;
            row.bdate = normalize_date(&row.bdate)?;
            Some(row)
        },
        |store, row: &Passenger| insert_passenger(store, row, IMPORT_ACTOR),
    )?;

    let bookings = import_table(
        store,
        dir,
        BOOKING_FILE,
        "booking",
        |mut row: Booking| {
            row.validate().ok()?;
            row.departure = normalize_date(&row.departure)?;
            Some(row)
        },
        |store, row: &Booking| insert_booking(store, row, IMPORT_ACTOR),
    )?;

    let ratings = import_table(
        store,
        dir,
        RATING_FILE,
        "ratings",
        |mut row: Rating| {
            row.validate().ok()?;
            row.comment = row.comment.filter(|c| !c.is_empty());
            Some(row)
        },
        |store, row: &Rating| insert_rating(store, row, IMPORT_ACTOR),
    )?;

    Ok(vec![airlines, flights, passengers, bookings, ratings])
}
