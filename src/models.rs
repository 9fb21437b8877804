// ✈️ Row shapes for the airline schema
// Field names match the column names so the same structs read CSV seed files.

use crate::validators::{
    is_valid_country, is_valid_date, is_valid_flight_number, is_valid_name, is_valid_passport,
    MAX_SCORE, MIN_SCORE,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    pub airid: i64,
    pub name: String,
    pub founded: i64,
    pub country: String,
    pub hub: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub airid: i64,
    pub flightnum: String,
    pub origin: String,
    pub destination: String,
    pub plane: String,
    pub seats: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub pid: i64,
    pub passnum: String,
    pub fullname: String,
    pub bdate: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub bookref: String,
    pub departure: String,
    pub flightnum: String,
    pub pid: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rid: i64,
    pub pid: i64,
    pub flightnum: String,
    pub score: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

// ============================================================================
// SHAPE CHECKS
// ============================================================================

/// A record failed a field-level check
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check(errors: &mut Vec<FieldError>, ok: bool, field: &'static str, message: &str) {
    if !ok {
        errors.push(FieldError {
            field,
            message: message.to_string(),
        });
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl Passenger {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check(&mut errors, is_valid_passport(&self.passnum), "passnum", "must be exactly 10 characters");
        check(&mut errors, is_valid_name(&self.fullname), "fullname", "must be 1-24 characters");
        check(&mut errors, is_valid_date(&self.bdate), "bdate", "must be a valid YYYY-MM-DD date");
        check(&mut errors, is_valid_country(&self.country), "country", "must be 1-24 characters");
        finish(errors)
    }
}

impl Booking {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check(
            &mut errors,
            self.bookref.chars().count() == crate::identity::BOOKING_REF_LEN
                && self.bookref.chars().all(|c| c.is_ascii_alphanumeric()),
            "bookref",
            "must be 10 alphanumeric characters",
        );
        check(&mut errors, is_valid_date(&self.departure), "departure", "must be a valid YYYY-MM-DD date");
        check(&mut errors, is_valid_flight_number(&self.flightnum), "flightnum", "must be 1-8 characters");
        finish(errors)
    }
}

impl Rating {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check(&mut errors, is_valid_flight_number(&self.flightnum), "flightnum", "must be 1-8 characters");
        check(
            &mut errors,
            (MIN_SCORE..=MAX_SCORE).contains(&self.score),
            "score",
            "must be between 0 and 5",
        );
        finish(errors)
    }
}

impl Flight {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check(&mut errors, is_valid_flight_number(&self.flightnum), "flightnum", "must be 1-8 characters");
        finish(errors)
    }
}
