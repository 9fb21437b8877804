//! Inserts for fully validated records, each followed by an audit event.

use crate::audit::{self, Event};
use crate::error::StoreError;
use crate::models::{Airline, Booking, Flight, Passenger, Rating};
use crate::store::DataStore;
use rusqlite::params;
use tracing::info;

pub fn insert_passenger(store: &dyn DataStore, passenger: &Passenger, actor: &str) -> Result<(), StoreError> {
    store.execute(
        "INSERT INTO passenger (pid, passnum, fullname, bdate, country) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            passenger.pid,
            passenger.passnum,
            passenger.fullname,
            passenger.bdate,
            passenger.country,
        ],
    )?;
    info!(pid = passenger.pid, "passenger added");

    audit::record(
        store,
        Event::new(
            "passenger_added",
            "passenger",
            &passenger.pid.to_string(),
            serde_json::json!({ "passnum": passenger.passnum, "country": passenger.country }),
            actor,
        ),
    );
    Ok(())
}

pub fn insert_booking(store: &dyn DataStore, booking: &Booking, actor: &str) -> Result<(), StoreError> {
    store.execute(
        "INSERT INTO booking (bookref, departure, flightnum, pid) VALUES (?1, ?2, ?3, ?4)",
        params![booking.bookref, booking.departure, booking.flightnum, booking.pid],
    )?;
    info!(bookref = %booking.bookref, flightnum = %booking.flightnum, "booking created");

    audit::record(
        store,
        Event::new(
            "booking_created",
            "booking",
            &booking.bookref,
            serde_json::json!({
                "flightnum": booking.flightnum,
                "departure": booking.departure,
                "pid": booking.pid,
            }),
            actor,
        ),
    );
    Ok(())
}

pub fn insert_rating(store: &dyn DataStore, rating: &Rating, actor: &str) -> Result<(), StoreError> {
    store.execute(
        "INSERT INTO ratings (rid, pid, flightnum, score, comment) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![rating.rid, rating.pid, rating.flightnum, rating.score, rating.comment],
    )?;
    info!(rid = rating.rid, flightnum = %rating.flightnum, score = rating.score, "rating submitted");

    audit::record(
        store,
        Event::new(
            "rating_submitted",
            "rating",
            &rating.rid.to_string(),
            serde_json::json!({ "flightnum": rating.flightnum, "score": rating.score }),
            actor,
        ),
    );
    Ok(())
}

// Reference data only arrives through the CSV import, so no audit rows.

pub fn insert_airline(store: &dyn DataStore, airline: &Airline) -> Result<(), StoreError> {
    store.execute(
        "INSERT INTO airline (airid, name, founded, country, hub) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![airline.airid, airline.name, airline.founded, airline.country, airline.hub],
    )?;
    Ok(())
}

pub fn insert_flight(store: &dyn DataStore, flight: &Flight) -> Result<(), StoreError> {
    store.execute(
        "INSERT INTO flight (airid, flightnum, origin, destination, plane, seats, duration)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            flight.airid,
            flight.flightnum,
            flight.origin,
            flight.destination,
            flight.plane,
            flight.seats,
            flight.duration,
        ],
    )?;
    Ok(())
}
