#![warn(clippy::all, missing_docs)]

//! Fare calculation and booking validation for KSRTC bus tickets.
//!
//! This crate owns the reference network, the field-by-field booking
//! gates and ticket issuing. It performs no terminal I/O; a presentation
//! layer feeds it raw input and renders the resulting [`Ticket`].

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod form;
pub mod models;
pub mod reference;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use engine::BookingEngine;
pub use error::{BookingError, ValidationError};
pub use form::{BookingForm, Field};
pub use models::{BookingRequest, BusType, FareBreakdown, Gender, Passenger, Ticket};
pub use reference::{Distance, DistanceTable, ReferenceData, Route, RouteGraph};
