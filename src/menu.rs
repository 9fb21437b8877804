//! Main menu loop for the console client.

use crate::console::Console;
use crate::error::WorkflowError;
use crate::store::DataStore;
use crate::workflow::Session;
use tracing::{error, info};

pub const MENU: &[&str] = &[
    "MAIN MENU",
    "---------",
    "1. Add Passenger",
    "2. Book Flight",
    "3. Review Flight",
    "4. Insert or Update Flight",
    "5. List Flights From Origin to Destination",
    "6. List Most Popular Destinations",
    "7. List Highest Rated Destinations",
    "8. List Flights to Destination in order of Duration",
    "9. Find Number of Available Seats on a given Flight",
    "10. < EXIT",
];

pub const EXIT_CHOICE: u32 = 10;

/// Prompt until an integer arrives. `None` at end of input.
pub fn read_choice<C: Console>(console: &mut C) -> Result<Option<u32>, WorkflowError> {
    loop {
        console.write_line("Please make your choice: ")?;
        let Some(line) = console.read_line()? else {
            return Ok(None);
        };
        match line.trim().parse::<u32>() {
            Ok(choice) => return Ok(Some(choice)),
            Err(_) => console.write_line("Your input is invalid!")?,
        }
    }
}

/// Run one menu entry. Errors are returned so the caller can report them.
pub fn dispatch<S: DataStore, C: Console>(session: &mut Session<S, C>, choice: u32) -> Result<(), WorkflowError> {
    match choice {
        1 => session.add_passenger().map(|_| ()),
        2 => session.book_flight().map(|_| ()),
        3 => session.submit_rating().map(|_| ()),
        4 => session.upsert_route(),
        5 => session.list_flights_between().map(|_| ()),
        6 => session.list_popular_destinations().map(|_| ()),
        7 => session.list_top_rated_routes().map(|_| ()),
        8 => session.list_flights_by_duration().map(|_| ()),
        9 => session.check_seat_availability().map(|_| ()),
        // Unknown numbers fall through to the menu
        _ => Ok(()),
    }
}

/// Show the menu until the user exits or input ends.
///
/// A failed operation is reported and the menu comes back; only console
/// I/O failures end the session early.
pub fn run_menu<S: DataStore, C: Console>(session: &mut Session<S, C>) -> Result<(), WorkflowError> {
    loop {
        for line in MENU {
            session.console_mut().write_line(line)?;
        }

        let choice = match read_choice(session.console_mut())? {
            Some(EXIT_CHOICE) | None => break,
            Some(choice) => choice,
        };

        match dispatch(session, choice) {
            Ok(()) => {}
            Err(WorkflowError::InputClosed) => break,
            Err(WorkflowError::Io(err)) => return Err(WorkflowError::Io(err)),
            Err(err) => {
                error!(choice, error = %err, "operation aborted");
                session.say(&format!("Operation aborted: {}", err))?;
            }
        }
    }

    info!("session ended");
    Ok(())
}
