//! Sequential booking gates.
//!
//! A [`BookingForm`] walks the fields of a booking in a fixed order. Each
//! submission either passes the current gate and advances, or fails and
//! leaves the form on the same field so the caller can re-prompt.

use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use tracing::debug;

use crate::{
    clock::Clock,
    engine::{title_case, BookingEngine, DATE_FORMAT, TIME_FORMAT},
    error::{BookingError, ValidationError},
    models::{BookingRequest, BusType, Passenger},
};

/// The field a form is currently asking for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Origin,
    Destination,
    BusType,
    TravelDate,
    TravelTime,
    PassengerCount,
    /// Zero-based passenger index.
    PassengerName(usize),
    PassengerAge(usize),
    PassengerGender(usize),
    Mobile,
    Email,
    Complete,
}

impl Field {
    /// Prompt text shown to the user for this field.
    pub fn prompt(&self) -> String {
        match self {
            Field::Origin => "Enter Origin City".to_string(),
            Field::Destination => "Enter Destination City".to_string(),
            Field::BusType => "Enter Bus Type".to_string(),
            Field::TravelDate => "Enter Travel Date (DD-MM-YYYY)".to_string(),
            Field::TravelTime => "Enter Travel Time (HH:MM in 24-hour format)".to_string(),
            Field::PassengerCount => "Enter Number of Passengers".to_string(),
            Field::PassengerName(index) => format!("Passenger {} - Enter Name", index + 1),
            Field::PassengerAge(index) => format!("Passenger {} - Enter Age", index + 1),
            Field::PassengerGender(index) => {
                format!("Passenger {} - Enter Gender (MALE/FEMALE/OTHERS)", index + 1)
            }
            Field::Mobile => "Enter Mobile Number".to_string(),
            Field::Email => "Enter Email ID (optional)".to_string(),
            Field::Complete => "Booking details complete".to_string(),
        }
    }
}

/// Field-by-field accumulator for a [`BookingRequest`].
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    field: Field,
    origin: Option<String>,
    destination: Option<String>,
    bus_type: Option<BusType>,
    travel_date: Option<NaiveDate>,
    travel_time: Option<NaiveTime>,
    passenger_count: usize,
    passengers: Vec<Passenger>,
    pending_name: String,
    pending_age: i64,
    mobile: Option<String>,
    email: Option<String>,
}

impl BookingForm {
    /// Empty form positioned on the origin gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Field awaiting input.
    pub fn field(&self) -> Field {
        self.field
    }

    /// Whether every gate has passed.
    pub fn is_complete(&self) -> bool {
        self.field == Field::Complete
    }

    /// Accepted origin, if the origin gate has passed.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Accepted bus type, if that gate has passed.
    pub fn bus_type(&self) -> Option<&BusType> {
        self.bus_type.as_ref()
    }

    /// Passengers accepted so far.
    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    /// Run the current gate on `raw`. Returns the next field on success.
    pub fn submit<C: Clock, R: Rng>(
        &mut self,
        engine: &BookingEngine<C, R>,
        raw: &str,
    ) -> Result<Field, ValidationError> {
        let field = self.field;
        let raw = raw.trim();
        let next = self.apply(engine, raw).map_err(|err| {
            debug!(?field, input = raw, %err, "Booking gate rejected input");
            err
        })?;
        self.field = next;
        Ok(next)
    }

    fn apply<C: Clock, R: Rng>(
        &mut self,
        engine: &BookingEngine<C, R>,
        raw: &str,
    ) -> Result<Field, ValidationError> {
        let next = match self.field {
            Field::Origin => {
                self.origin = Some(engine.validate_origin(raw)?);
                Field::Destination
            }
            Field::Destination => {
                let origin = self.origin.as_deref().unwrap_or_default();
                self.destination = Some(engine.validate_destination(origin, raw)?);
                Field::BusType
            }
            Field::BusType => {
                self.bus_type = Some(engine.validate_bus_type(raw)?);
                Field::TravelDate
            }
            Field::TravelDate => {
                self.travel_date = Some(engine.validate_date(raw)?);
                Field::TravelTime
            }
            Field::TravelTime => {
                self.travel_time = Some(engine.validate_time(raw)?);
                Field::PassengerCount
            }
            Field::PassengerCount => {
                let count = raw.parse::<i64>().map_err(|_| {
                    ValidationError::InvalidPassengerCount {
                        max: crate::engine::MAX_PASSENGERS,
                    }
                })?;
                self.passenger_count = engine.validate_passenger_count(count)?;
                self.passengers.clear();
                Field::PassengerName(0)
            }
            Field::PassengerName(index) => {
                self.pending_name = title_case(raw);
                Field::PassengerAge(index)
            }
            Field::PassengerAge(index) => {
                let age = raw.parse::<i64>().map_err(|_| ValidationError::InvalidAge)?;
                engine.validate_age(age)?;
                self.pending_age = age;
                Field::PassengerGender(index)
            }
            Field::PassengerGender(index) => {
                let passenger =
                    engine.validate_passenger(index, &self.pending_name, self.pending_age, raw)?;
                self.passengers.push(passenger);
                if index + 1 < self.passenger_count {
                    Field::PassengerName(index + 1)
                } else {
                    Field::Mobile
                }
            }
            Field::Mobile => {
                self.mobile = Some(engine.validate_mobile(raw)?);
                Field::Email
            }
            Field::Email => {
                self.email = (!raw.is_empty()).then(|| raw.to_string());
                Field::Complete
            }
            Field::Complete => Field::Complete,
        };
        Ok(next)
    }

    /// Label/value pairs for every accepted field, in gate order.
    pub fn summary(&self) -> Vec<(String, String)> {
        let mut lines = Vec::new();
        let mut push = |label: &str, value: Option<String>| {
            if let Some(value) = value {
                lines.push((label.to_string(), value));
            }
        };
        push("From", self.origin.clone());
        push("To", self.destination.clone());
        push("Bus Type", self.bus_type.as_ref().map(|bus| bus.name.clone()));
        push(
            "Travel Date",
            self.travel_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
        );
        push(
            "Travel Time",
            self.travel_time
                .map(|time| time.format(TIME_FORMAT).to_string()),
        );
        push(
            "Passengers",
            (self.passenger_count > 0).then(|| self.passenger_count.to_string()),
        );
        for passenger in &self.passengers {
            push(
                &passenger.seat,
                Some(format!(
                    "{}, {}, {}",
                    passenger.name, passenger.age, passenger.gender
                )),
            );
        }
        push("Mobile", self.mobile.clone());
        push("Email", self.email.clone());
        lines
    }

    /// Consume a completed form. Fails if any gate is still open.
    pub fn into_request(self) -> Result<BookingRequest, BookingError> {
        let incomplete = || BookingError::BookingFailed("booking form is incomplete".to_string());
        if !self.is_complete() {
            return Err(incomplete());
        }
        Ok(BookingRequest {
            origin: self.origin.ok_or_else(incomplete)?,
            destination: self.destination.ok_or_else(incomplete)?,
            bus_type: self.bus_type.ok_or_else(incomplete)?,
            travel_date: self.travel_date.ok_or_else(incomplete)?,
            travel_time: self.travel_time.ok_or_else(incomplete)?,
            passengers: self.passengers,
            mobile: self.mobile.ok_or_else(incomplete)?,
            email: self.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FixedClock, reference::ReferenceData};
    use rand::{rngs::StdRng, SeedableRng};
    use rust_decimal::Decimal;

    fn engine() -> BookingEngine<FixedClock, StdRng> {
        let now = NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .expect("valid fixture timestamp");
        BookingEngine::with_sources(ReferenceData::default(), FixedClock(now), StdRng::seed_from_u64(1))
    }

    fn fill(form: &mut BookingForm, engine: &BookingEngine<FixedClock, StdRng>, inputs: &[&str]) {
        for input in inputs {
            form.submit(engine, input)
                .unwrap_or_else(|err| panic!("{input:?} rejected: {err}"));
        }
    }

    #[test]
    fn walks_every_gate_in_order() -> Result<(), BookingError> {
        let mut engine = engine();
        let mut form = BookingForm::new();
        fill(
            &mut form,
            &engine,
            &[
                "bangalore",
                "mysore",
                "volvo",
                "25-12-2026",
                "21:15",
                "2",
                "asha rao",
                "34",
                "female",
                "ravi",
                "36",
                "MALE",
                "9876543210",
                "",
            ],
        );
        assert!(form.is_complete());

        let request = form.into_request()?;
        assert_eq!(request.origin, "Bangalore");
        assert_eq!(request.destination, "Mysore");
        assert_eq!(request.passengers[0].name, "Asha Rao");
        assert_eq!(request.passengers[1].seat, "S02");
        assert_eq!(request.email, None);

        let ticket = engine.build_ticket(request)?;
        assert_eq!(ticket.fare.total_amount, Decimal::new(630, 0));
        Ok(())
    }

    #[test]
    fn rejection_keeps_form_on_same_field() {
        let engine = engine();
        let mut form = BookingForm::new();
        fill(&mut form, &engine, &["Hubli"]);

        let err = form.submit(&engine, "Ooty").expect_err("Ooty is not reachable from Hubli");
        assert!(matches!(err, ValidationError::UnreachableDestination { .. }));
        assert_eq!(form.field(), Field::Destination);

        assert_eq!(form.submit(&engine, "Belgaum"), Ok(Field::BusType));
    }

    #[test]
    fn non_numeric_counts_and_ages_are_rejected() {
        let engine = engine();
        let mut form = BookingForm::new();
        fill(
            &mut form,
            &engine,
            &["Mysore", "Coorg", "Express", "18-10-2026", "06:45"],
        );

        assert_eq!(
            form.submit(&engine, "two"),
            Err(ValidationError::InvalidPassengerCount { max: 10 })
        );
        assert_eq!(
            form.submit(&engine, "11"),
            Err(ValidationError::InvalidPassengerCount { max: 10 })
        );
        assert_eq!(form.submit(&engine, "1"), Ok(Field::PassengerName(0)));
        assert_eq!(form.submit(&engine, "kiran"), Ok(Field::PassengerAge(0)));
        assert_eq!(form.submit(&engine, "old"), Err(ValidationError::InvalidAge));
        assert_eq!(form.submit(&engine, "121"), Err(ValidationError::InvalidAge));
        assert_eq!(form.submit(&engine, "120"), Ok(Field::PassengerGender(0)));
        assert_eq!(form.submit(&engine, "other"), Err(ValidationError::InvalidGender));
        assert_eq!(form.submit(&engine, "others"), Ok(Field::Mobile));
        assert_eq!(form.submit(&engine, "12345"), Err(ValidationError::InvalidMobile));
        assert_eq!(form.field(), Field::Mobile);
    }

    #[test]
    fn incomplete_form_cannot_become_a_request() {
        let engine = engine();
        let mut form = BookingForm::new();
        fill(&mut form, &engine, &["Hassan", "Belur"]);
        assert!(matches!(
            form.into_request(),
            Err(BookingError::BookingFailed(_))
        ));
    }

    #[test]
    fn summary_lists_accepted_fields() {
        let engine = engine();
        let mut form = BookingForm::new();
        fill(&mut form, &engine, &["Mangalore", "Udupi", "Sleeper"]);
        let summary = form.summary();
        assert_eq!(
            summary,
            vec![
                ("From".to_string(), "Mangalore".to_string()),
                ("To".to_string(), "Udupi".to_string()),
                ("Bus Type".to_string(), "Sleeper".to_string()),
            ]
        );
        assert_eq!(form.field().prompt(), "Enter Travel Date (DD-MM-YYYY)");
    }
}
