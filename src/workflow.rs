//! Interactive booking operations.
//!
//! Every operation follows the same pipeline: prompt for each field in a
//! fixed order, re-prompt until the field is accepted, then build one
//! parameterized statement and report the outcome. A [`Session`] carries the
//! store, the console and the random source explicitly.

use crate::console::{render_table, Console};
use crate::error::{Rejection, StoreError, WorkflowError};
use crate::identity::{generate_booking_reference, next_id, SurrogateKey};
use crate::lookup::{flight_exists, is_passport_unique, passport_exists, resolve_passenger_id};
use crate::models::{Booking, Passenger, Rating};
use crate::records::{insert_booking, insert_passenger, insert_rating};
use crate::reports::{self, SeatAvailability};
use crate::retry::RetryPolicy;
use crate::store::{DataStore, ResultSet};
use crate::validators::{
    is_valid_country, is_valid_flight_number, is_valid_name, is_valid_passport, normalize_date,
    parse_count, parse_score, MAX_COUNTRY_LEN, MAX_FLIGHT_NUM_LEN, MAX_NAME_LEN, PASSPORT_LEN,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

/// Actor name stamped on audit events written from the console
pub const CONSOLE_ACTOR: &str = "console";

pub struct Session<S, C> {
    store: S,
    console: C,
    rng: StdRng,
    retry: RetryPolicy,
}

impl<S: DataStore, C: Console> Session<S, C> {
    pub fn new(store: S, console: C) -> Self {
        Session {
            store,
            console,
            rng: StdRng::from_entropy(),
            retry: RetryPolicy::unbounded(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Deterministic booking references
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn into_parts(self) -> (S, C) {
        (self.store, self.console)
    }

    pub(crate) fn say(&mut self, line: &str) -> Result<(), WorkflowError> {
        self.console.write_line(line)?;
        Ok(())
    }

    // ========================================================================
    // FIELD PROMPTS
    // ========================================================================

    /// Ask until `accept` takes the answer or the retry budget runs out.
    fn prompt_field<T>(
        &mut self,
        field: &'static str,
        prompt: &str,
        mut accept: impl FnMut(&S, &str) -> Result<T, Rejection>,
    ) -> Result<T, WorkflowError> {
        let mut attempts = 0;
        loop {
            self.say(prompt)?;
            let line = self.console.read_line()?.ok_or(WorkflowError::InputClosed)?;

            match accept(&self.store, line.trim()) {
                Ok(value) => return Ok(value),
                Err(rejection) => {
                    attempts += 1;
                    match &rejection {
                        Rejection::Unverified { source, .. } => {
                            warn!(field, error = %source, "lookup failed, treating as rejected")
                        }
                        other => debug!(field, reason = %other, "input rejected"),
                    }
                    self.say(&rejection.to_string())?;
                    if self.retry.exhausted(attempts) {
                        return Err(WorkflowError::AttemptsExhausted { field, attempts });
                    }
                }
            }
        }
    }

    fn prompt_date(&mut self, field: &'static str, prompt: &str) -> Result<String, WorkflowError> {
        self.prompt_field(field, prompt, |_, input| {
            normalize_date(input)
                .ok_or_else(|| Rejection::Invalid(format!("'{}' is not a valid date (YYYY-MM-DD)", input)))
        })
    }

    fn prompt_count(&mut self, field: &'static str, prompt: &str) -> Result<u32, WorkflowError> {
        self.prompt_field(field, prompt, |_, input| {
            parse_count(input)
                .ok_or_else(|| Rejection::Invalid(format!("'{}' is not a non-negative whole number", input)))
        })
    }

    fn prompt_text(&mut self, field: &'static str, prompt: &str) -> Result<String, WorkflowError> {
        self.prompt_field(field, prompt, |_, input| Ok(input.to_string()))
    }

    /// Existing flight number of at most 8 characters
    fn prompt_flight(&mut self, prompt: &str) -> Result<String, WorkflowError> {
        self.prompt_field("flight number", prompt, |store, input| {
            if !is_valid_flight_number(input) {
                return Err(Rejection::Invalid(format!(
                    "Flight number must be 1-{} characters",
                    MAX_FLIGHT_NUM_LEN
                )));
            }
            match flight_exists(store, input) {
                Ok(true) => Ok(input.to_string()),
                Ok(false) => Err(Rejection::NotFound(format!("Flight {} not found", input))),
                Err(source) => Err(unverified("flight", source)),
            }
        })
    }

    /// Passport of a known passenger
    fn prompt_known_passport(&mut self) -> Result<String, WorkflowError> {
        self.prompt_field("passport", "Enter Passport number", |store, input| {
            if !is_valid_passport(input) {
                return Err(passport_length_rejection());
            }
            match passport_exists(store, input) {
                Ok(true) => Ok(input.to_string()),
                Ok(false) => Err(Rejection::NotFound(format!("No passenger holds passport {}", input))),
                Err(source) => Err(unverified("passport", source)),
            }
        })
    }

    fn resolve_pid(&mut self, passnum: &str) -> Result<i64, WorkflowError> {
        resolve_passenger_id(&self.store, passnum)?
            .ok_or_else(|| WorkflowError::PassengerNotResolved(passnum.to_string()))
    }

    fn print_result(&mut self, result: &ResultSet) -> Result<(), WorkflowError> {
        if result.is_empty() {
            return self.say("No results.");
        }
        for line in render_table(result) {
            self.say(&line)?;
        }
        self.say(&format!("{} row(s)", result.len()))
    }

    // ========================================================================
    // OPERATIONS
    // ========================================================================

    /// 1. name → birth date → country → unique passport → generated id → insert
    pub fn add_passenger(&mut self) -> Result<Passenger, WorkflowError> {
        let fullname = self.prompt_field("name", "Enter Passenger's Full Name", |_, input| {
            if is_valid_name(input) {
                Ok(input.to_string())
            } else {
                Err(Rejection::Invalid(format!("Name must be 1-{} characters", MAX_NAME_LEN)))
            }
        })?;

        let bdate = self.prompt_date("date of birth", "Enter Date of Birth (format: YYYY-MM-DD)")?;

        let country = self.prompt_field("country", "Enter Country", |_, input| {
            if is_valid_country(input) {
                Ok(input.to_string())
            } else {
                Err(Rejection::Invalid(format!("Country must be 1-{} characters", MAX_COUNTRY_LEN)))
            }
        })?;

        let passnum = self.prompt_field("passport", "Enter Passport number", |store, input| {
            if !is_valid_passport(input) {
                return Err(passport_length_rejection());
            }
            match is_passport_unique(store, input) {
                Ok(true) => Ok(input.to_string()),
                Ok(false) => Err(Rejection::Taken(format!("Passport {} is already registered", input))),
                Err(source) => Err(unverified("passport", source)),
            }
        })?;

        let pid = next_id(&self.store, SurrogateKey::Passenger)?;

        let passenger = Passenger {
            pid,
            passnum,
            fullname,
            bdate,
            country,
        };
        insert_passenger(&self.store, &passenger, CONSOLE_ACTOR)?;
        self.say(&format!("Passenger added with ID {}", passenger.pid))?;
        Ok(passenger)
    }

    /// 2. generated reference → departure → flight → passport → passenger id → insert
    pub fn book_flight(&mut self) -> Result<Booking, WorkflowError> {
        let bookref = generate_booking_reference(&self.store, &mut self.rng, self.retry)?;
        self.say(&format!("Booking reference: {}", bookref))?;

        let departure = self.prompt_date("departure date", "Enter a departure date (format: YYYY-MM-DD)")?;
        let flightnum = self.prompt_flight("Enter a flight number")?;
        let passnum = self.prompt_known_passport()?;
        let pid = self.resolve_pid(&passnum)?;

        let booking = Booking {
            bookref,
            departure,
            flightnum,
            pid,
        };
        insert_booking(&self.store, &booking, CONSOLE_ACTOR)?;
        self.say(&format!(
            "Booked flight {} on {} (reference {})",
            booking.flightnum, booking.departure, booking.bookref
        ))?;
        Ok(booking)
    }

    /// 3. generated id → passport → passenger id → flight → score → comment → insert
    pub fn submit_rating(&mut self) -> Result<Rating, WorkflowError> {
        let rid = next_id(&self.store, SurrogateKey::Rating)?;

        let passnum = self.prompt_known_passport()?;
        let pid = self.resolve_pid(&passnum)?;
        let flightnum = self.prompt_flight("Enter a flight number")?;

        let score = self.prompt_field("score", "Enter a score (0-5)", |_, input| {
            parse_score(input)
                .ok_or_else(|| Rejection::Invalid(format!("'{}' is not a whole score from 0 to 5", input)))
        })?;

        let comment = self.prompt_text("comment", "Enter a comment")?;
        let comment = (!comment.is_empty()).then_some(comment);

        let rating = Rating {
            rid,
            pid,
            flightnum,
            score,
            comment,
        };
        insert_rating(&self.store, &rating, CONSOLE_ACTOR)?;
        self.say(&format!("Thank you! Rating {} recorded", rating.rid))?;
        Ok(rating)
    }

    /// 4. Not available
    pub fn upsert_route(&mut self) -> Result<(), WorkflowError> {
        Err(WorkflowError::Unsupported("inserting or updating an airline route"))
    }

    /// 5. All flights from origin to destination
    pub fn list_flights_between(&mut self) -> Result<ResultSet, WorkflowError> {
        let origin = self.prompt_text("origin", "Enter a flight origin")?;
        let destination = self.prompt_text("destination", "Enter a flight destination")?;

        let result = reports::flights_between(&self.store, &origin, &destination)?;
        self.print_result(&result)?;
        Ok(result)
    }

    /// 6. The k destinations with the most flights
    pub fn list_popular_destinations(&mut self) -> Result<ResultSet, WorkflowError> {
        let k = self.prompt_count("count", "Enter number of most popular destinations to see")?;

        let result = reports::popular_destinations(&self.store, k)?;
        self.print_result(&result)?;
        Ok(result)
    }

    /// 7. The k routes with the best average rating
    pub fn list_top_rated_routes(&mut self) -> Result<ResultSet, WorkflowError> {
        let k = self.prompt_count("count", "How many highest rated routes would you like to see?")?;

        let result = reports::top_rated_routes(&self.store, k)?;
        self.print_result(&result)?;
        Ok(result)
    }

    /// 8. Flights on a route, shortest first
    pub fn list_flights_by_duration(&mut self) -> Result<ResultSet, WorkflowError> {
        let origin = self.prompt_text("origin", "Enter a flight origin")?;
        let destination = self.prompt_text("destination", "Enter a flight destination")?;
        let limit = self.prompt_count("count", "Enter the number of desired records")?;

        let result = reports::flights_by_duration(&self.store, &origin, &destination, limit)?;
        self.print_result(&result)?;
        Ok(result)
    }

    /// 9. Free seats on a flight for one departure date
    pub fn check_seat_availability(&mut self) -> Result<SeatAvailability, WorkflowError> {
        let flightnum = self.prompt_flight("Enter a flight number")?;
        let departure = self.prompt_date("flight date", "Enter a flight date (YYYY-MM-DD)")?;

        let availability = reports::seat_availability(&self.store, &flightnum, &departure)?;
        match availability {
            SeatAvailability::Available { seats } => {
                self.say(&format!("Number of available seats: {}", seats))?
            }
            SeatAvailability::FlightNotFound => self.say("Error could not find the flight")?,
        }
        Ok(availability)
    }
}

fn unverified(what: &'static str, source: StoreError) -> Rejection {
    Rejection::Unverified { what, source }
}

fn passport_length_rejection() -> Rejection {
    Rejection::Invalid(format!("Passport number must be exactly {} characters", PASSPORT_LEN))
}
