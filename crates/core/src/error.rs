//! Error types surfaced by the booking engine.

use thiserror::Error;

/// A rejected booking field. Every variant is user-correctable: the caller
/// re-prompts for the same field and does not advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Origin is not a key of the route graph.
    #[error("Invalid origin city '{0}'. Please choose from available routes.")]
    UnknownCity(String),
    /// Destination is not reachable from the chosen origin.
    #[error("Invalid destination '{city}'. Available destinations from {origin}: {}", .valid.join(", "))]
    UnreachableDestination {
        /// Origin the destination was checked against.
        origin: String,
        /// Rejected destination.
        city: String,
        /// Destinations reachable from `origin`, in configured order.
        valid: Vec<String>,
    },
    /// Bus type name is not configured.
    #[error("Invalid bus type '{name}'. Please choose from: {}", .valid.join(", "))]
    UnknownBusType {
        /// Rejected name.
        name: String,
        /// Configured bus-type names.
        valid: Vec<String>,
    },
    /// Travel date is not `DD-MM-YYYY` or names a non-existent day.
    #[error("Invalid date format. Please use DD-MM-YYYY format.")]
    MalformedDate,
    /// Travel date lies before today.
    #[error("Travel date cannot be in the past. Please enter a valid date.")]
    PastDate,
    /// Travel time is not `HH:MM` in 24-hour form.
    #[error("Invalid time format. Please use HH:MM format (e.g., 14:30).")]
    MalformedTime,
    /// Passenger count outside 1..=10 or not a number.
    #[error("Number of passengers must be between 1 and {max}.")]
    InvalidPassengerCount {
        /// Upper bound that was enforced.
        max: usize,
    },
    /// Age outside 1..=120 or not a number.
    #[error("Please enter a valid age (1-120).")]
    InvalidAge,
    /// Gender is not one of MALE, FEMALE, OTHERS.
    #[error("Please enter MALE, FEMALE or OTHERS.")]
    InvalidGender,
    /// Mobile is not exactly ten decimal digits.
    #[error("Please enter a valid 10-digit mobile number.")]
    InvalidMobile,
}

/// Failure while turning a request into a ticket.
#[derive(Debug, Error)]
pub enum BookingError {
    /// A field failed its gate.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Internal fault while constructing the ticket. No partial ticket is
    /// ever returned alongside this.
    #[error("booking failed: {0}")]
    BookingFailed(String),
}
