// Air Booking - Core Library
// Validation, lookups and identity generation for the airline booking console,
// shared by the console client and the API server

pub mod store;
pub mod error;
pub mod validators;  // Pure input predicates
pub mod lookup;      // Existence/uniqueness checks against the store
pub mod identity;    // Surrogate keys + booking references
pub mod retry;
pub mod models;
pub mod records;     // Inserts + audit events
pub mod reports;     // Read-only queries
pub mod audit;
pub mod console;
pub mod workflow;    // Interactive operations
pub mod menu;
pub mod import;      // CSV seeding
pub mod config;

// Re-export commonly used types
pub use store::{DataStore, ResultSet, SqliteStore, setup_database};
pub use error::{StoreError, Rejection, IdentityError, WorkflowError};
pub use validators::{
    is_numeric, is_valid_date, is_leap_year, is_valid_score,
    is_valid_passport, is_valid_flight_number, is_valid_name, is_valid_country,
    normalize_date, parse_count, parse_score,
};
pub use lookup::{flight_exists, passport_exists, is_passport_unique, resolve_passenger_id};
pub use identity::{next_id, generate_booking_reference, SurrogateKey, BOOKING_REF_LEN};
pub use retry::RetryPolicy;
pub use models::{Airline, Flight, Passenger, Booking, Rating};
pub use reports::{
    flights_between, popular_destinations, top_rated_routes, flights_by_duration,
    seat_availability, SeatAvailability,
};
pub use audit::{Event, insert_event, events_for_entity};
pub use console::{Console, LineConsole};
pub use workflow::Session;
pub use menu::run_menu;
pub use import::{import_directory, TableSummary};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
