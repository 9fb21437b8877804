// 📊 Read-only reports over the flight schema

use crate::error::StoreError;
use crate::store::{DataStore, ResultSet};
use rusqlite::params;
use serde::Serialize;

/// flightnum, origin, destination, plane, duration for one route
pub fn flights_between(store: &dyn DataStore, origin: &str, destination: &str) -> Result<ResultSet, StoreError> {
    store.query(
        "SELECT f.flightnum, f.origin, f.destination, f.plane, f.duration
         FROM flight f
         WHERE f.origin = ?1 AND f.destination = ?2",
        params![origin, destination],
    )
}

/// Top `k` destinations by number of flights offered
pub fn popular_destinations(store: &dyn DataStore, k: u32) -> Result<ResultSet, StoreError> {
    store.query(
        "SELECT f.destination, COUNT(f.destination) AS num_of
         FROM flight f
         GROUP BY f.destination
         ORDER BY num_of DESC, f.destination
         LIMIT ?1",
        params![k],
    )
}

/// Top `k` rated routes with their airline and average score
pub fn top_rated_routes(store: &dyn DataStore, k: u32) -> Result<ResultSet, StoreError> {
    store.query(
        "SELECT a.name, r.flightnum, f.origin, f.destination, f.plane, AVG(r.score) AS avg_score
         FROM airline a, flight f, ratings r
         WHERE a.airid = f.airid AND f.flightnum = r.flightnum
         GROUP BY a.name, r.flightnum, f.origin, f.destination, f.plane
         ORDER BY avg_score DESC, r.flightnum
         LIMIT ?1",
        params![k],
    )
}

/// Up to `limit` flights on a route, shortest first
pub fn flights_by_duration(
    store: &dyn DataStore,
    origin: &str,
    destination: &str,
    limit: u32,
) -> Result<ResultSet, StoreError> {
    store.query(
        "SELECT a.name, f.flightnum, f.origin, f.destination, f.plane, f.duration
         FROM airline a, flight f
         WHERE a.airid = f.airid AND f.origin = ?1 AND f.destination = ?2
         ORDER BY f.duration, f.flightnum
         LIMIT ?3",
        params![origin, destination, limit],
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeatAvailability {
    Available { seats: i64 },
    FlightNotFound,
}

/// Capacity minus bookings on `departure`. Dates compare as stored text,
/// so pass the normalized `YYYY-MM-DD` form.
pub fn seat_availability(
    store: &dyn DataStore,
    flightnum: &str,
    departure: &str,
) -> Result<SeatAvailability, StoreError> {
    let capacity = store.query_scalar(
        "SELECT seats FROM flight WHERE flightnum = ?1",
        params![flightnum],
    )?;
    let booked = store.query_scalar(
        "SELECT COUNT(*) FROM booking b WHERE b.flightnum = ?1 AND b.departure = ?2",
        params![flightnum, departure],
    )?;

    let parsed = capacity
        .and_then(|c| c.parse::<i64>().ok())
        .zip(booked.and_then(|b| b.parse::<i64>().ok()));

    Ok(match parsed {
        Some((capacity, booked)) => SeatAvailability::Available {
            seats: capacity - booked,
        },
        None => SeatAvailability::FlightNotFound,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        for sql in [
            "INSERT INTO airline (airid, name, founded, country, hub) VALUES (1, 'Aero', 1990, 'USA', 'LAX')",
            "INSERT INTO airline (airid, name, founded, country, hub) VALUES (2, 'Nippon Sky', 1970, 'Japan', 'HND')",
            "INSERT INTO flight VALUES (1, 'AE100', 'LAX', 'NRT', 'A350', 150, 11)",
            "INSERT INTO flight VALUES (2, 'NS200', 'LAX', 'NRT', 'B787', 240, 10)",
            "INSERT INTO flight VALUES (1, 'AE300', 'LAX', 'JFK', 'A321', 180, 5)",
            "INSERT INTO flight VALUES (2, 'NS400', 'HND', 'NRT', 'B737', 120, 1)",
            "INSERT INTO passenger VALUES (1, 'AB12345678', 'Ann Lee', '1990-01-01', 'USA')",
            "INSERT INTO passenger VALUES (2, 'CD12345678', 'Bo Kim', '1985-07-12', 'Korea')",
            "INSERT INTO ratings VALUES (1, 1, 'AE100', 3, NULL)",
            "INSERT INTO ratings VALUES (2, 2, 'AE100', 4, 'fine')",
            "INSERT INTO ratings VALUES (3, 1, 'NS200', 5, 'great')",
        ] {
            store.execute(sql, &[]).unwrap();
        }
        store
    }

    #[test]
    fn test_flights_between() {
        let store = seeded();
        let result = flights_between(&store, "LAX", "NRT").unwrap();

        assert_eq!(result.columns, vec!["flightnum", "origin", "destination", "plane", "duration"]);
        assert_eq!(result.len(), 2);
        assert!(flights_between(&store, "NRT", "LAX").unwrap().is_empty());
    }

    #[test]
    fn test_popular_destinations() {
        let store = seeded();
        let result = popular_destinations(&store, 1).unwrap();

        assert_eq!(result.columns, vec!["destination", "num_of"]);
        assert_eq!(result.rows, vec![vec!["NRT", "3"]]);
        assert!(popular_destinations(&store, 0).unwrap().is_empty());
    }

    #[test]
    fn test_top_rated_routes() {
        let store = seeded();
        let result = top_rated_routes(&store, 2).unwrap();

        assert_eq!(result.columns.last().map(String::as_str), Some("avg_score"));
        assert_eq!(result.rows[0][0], "Nippon Sky");
        assert_eq!(result.rows[0][1], "NS200");
        assert_eq!(result.rows[1][1], "AE100");
        assert_eq!(result.rows[1][5], "3.5");
    }

    #[test]
    fn test_flights_by_duration() {
        let store = seeded();
        let result = flights_by_duration(&store, "LAX", "NRT", 5).unwrap();

        let flights: Vec<_> = result.rows.iter().map(|row| row[1].as_str()).collect();
        assert_eq!(flights, vec!["NS200", "AE100"]);

        assert_eq!(flights_by_duration(&store, "LAX", "NRT", 1).unwrap().len(), 1);
    }

    #[test]
    fn test_seat_availability() {
        let store = seeded();
        for i in 0..132 {
            store
                .execute(
                    "INSERT INTO booking (bookref, departure, flightnum, pid) VALUES (?1, '2024-06-01', 'AE100', 1)",
                    params![format!("REF{:07}", i)],
                )
                .unwrap();
        }
        store
            .execute(
                "INSERT INTO booking (bookref, departure, flightnum, pid) VALUES ('OTHERDAY01', '2024-06-02', 'AE100', 2)",
                &[],
            )
            .unwrap();

        assert_eq!(
            seat_availability(&store, "AE100", "2024-06-01").unwrap(),
            SeatAvailability::Available { seats: 18 }
        );
        assert_eq!(
            seat_availability(&store, "AE100", "2024-06-03").unwrap(),
            SeatAvailability::Available { seats: 150 }
        );
        assert_eq!(
            seat_availability(&store, "ZZ999", "2024-06-01").unwrap(),
            SeatAvailability::FlightNotFound
        );
    }
}
