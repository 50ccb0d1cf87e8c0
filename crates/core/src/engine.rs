//! Fare calculation and booking validation.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    clock::{Clock, SystemClock},
    error::{BookingError, ValidationError},
    models::{BookingRequest, BusType, FareBreakdown, Gender, Passenger, Ticket},
    reference::ReferenceData,
};

/// Largest party a single booking may carry.
pub const MAX_PASSENGERS: usize = 10;
/// Youngest accepted passenger age.
pub const MIN_AGE: i64 = 1;
/// Oldest accepted passenger age.
pub const MAX_AGE: i64 = 120;
/// Prefix of every ticket number.
pub const TICKET_PREFIX: &str = "KSRTC";
/// State registration prefix of every bus number.
pub const BUS_PREFIX: &str = "KA";
/// Series letter between the two digit groups of a bus number.
pub const BUS_SERIES: char = 'F';
/// Input format for travel dates.
pub const DATE_FORMAT: &str = "%d-%m-%Y";
/// Input format for travel times.
pub const TIME_FORMAT: &str = "%H:%M";

/// 5% surcharge applied to the aggregate base fare.
const SERVICE_TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
const MAX_ID_ATTEMPTS: usize = 32;

static MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("invalid mobile regex"));

/// Identifiers already handed out by this engine.
#[derive(Debug, Default)]
struct IssuedIds {
    tickets: HashSet<String>,
    buses: HashSet<String>,
}

/// Validates booking fields against the reference data and prices tickets.
///
/// Reference data is fixed at construction. The clock and random source are
/// injected so tests can pin both.
pub struct BookingEngine<C = SystemClock, R = StdRng> {
    data: ReferenceData,
    clock: C,
    rng: R,
    issued: Option<IssuedIds>,
}

impl BookingEngine {
    /// Engine backed by the system clock and an entropy-seeded generator.
    pub fn new(data: ReferenceData) -> Self {
        Self::with_sources(data, SystemClock, StdRng::from_entropy())
    }
}

impl<C: Clock, R: Rng> BookingEngine<C, R> {
    /// Engine with explicit clock and random source.
    pub fn with_sources(data: ReferenceData, clock: C, rng: R) -> Self {
        Self {
            data,
            clock,
            rng,
            issued: None,
        }
    }

    /// Remember issued identifiers and redraw on collision.
    pub fn with_unique_ids(mut self, enabled: bool) -> Self {
        self.issued = enabled.then(IssuedIds::default);
        self
    }

    /// Reference data the engine validates against.
    pub fn reference_data(&self) -> &ReferenceData {
        &self.data
    }

    /// Current local date according to the injected clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.now().date()
    }

    /// Accept `city` if it is a known origin. Input is title-cased first.
    pub fn validate_origin(&self, city: &str) -> Result<String, ValidationError> {
        let city = title_case(city);
        if self.data.routes.destinations(&city).is_some() {
            Ok(city)
        } else {
            Err(ValidationError::UnknownCity(city))
        }
    }

    /// Accept `city` if `origin` has a route to it.
    pub fn validate_destination(&self, origin: &str, city: &str) -> Result<String, ValidationError> {
        let city = title_case(city);
        if self.data.routes.reaches(origin, &city) {
            return Ok(city);
        }
        Err(ValidationError::UnreachableDestination {
            origin: origin.to_string(),
            city,
            valid: self
                .data
                .routes
                .destinations(origin)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        })
    }

    /// Resolve a bus type by name.
    pub fn validate_bus_type(&self, name: &str) -> Result<BusType, ValidationError> {
        let name = title_case(name);
        self.data
            .bus_type(&name)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownBusType {
                name,
                valid: self.data.bus_type_names(),
            })
    }

    /// Parse a `DD-MM-YYYY` date that is today or later.
    pub fn validate_date(&self, text: &str) -> Result<NaiveDate, ValidationError> {
        let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map_err(|_| ValidationError::MalformedDate)?;
        if date < self.today() {
            return Err(ValidationError::PastDate);
        }
        Ok(date)
    }

    /// Parse a 24-hour `HH:MM` time.
    pub fn validate_time(&self, text: &str) -> Result<NaiveTime, ValidationError> {
        NaiveTime::parse_from_str(text.trim(), TIME_FORMAT)
            .map_err(|_| ValidationError::MalformedTime)
    }

    /// Accept a party size of 1 to [`MAX_PASSENGERS`].
    pub fn validate_passenger_count(&self, count: i64) -> Result<usize, ValidationError> {
        match usize::try_from(count) {
            Ok(count) if (1..=MAX_PASSENGERS).contains(&count) => Ok(count),
            _ => Err(ValidationError::InvalidPassengerCount {
                max: MAX_PASSENGERS,
            }),
        }
    }

    /// Validate one traveller. `index` is the zero-based position in the
    /// booking and determines the seat (`0` -> `S01`).
    pub fn validate_passenger(
        &self,
        index: usize,
        name: &str,
        age: i64,
        gender: &str,
    ) -> Result<Passenger, ValidationError> {
        Ok(Passenger {
            name: title_case(name),
            age: self.validate_age(age)?,
            gender: self.validate_gender(gender)?,
            seat: format!("S{:02}", index + 1),
        })
    }

    /// Accept ages 1 to 120 inclusive.
    pub fn validate_age(&self, age: i64) -> Result<u8, ValidationError> {
        if (MIN_AGE..=MAX_AGE).contains(&age) {
            Ok(age as u8)
        } else {
            Err(ValidationError::InvalidAge)
        }
    }

    /// Accept MALE, FEMALE or OTHERS in any case.
    pub fn validate_gender(&self, text: &str) -> Result<Gender, ValidationError> {
        text.parse().map_err(|_| ValidationError::InvalidGender)
    }

    /// Accept exactly ten ASCII digits.
    pub fn validate_mobile(&self, text: &str) -> Result<String, ValidationError> {
        let mobile = text.trim();
        if MOBILE_RE.is_match(mobile) {
            Ok(mobile.to_string())
        } else {
            Err(ValidationError::InvalidMobile)
        }
    }

    /// Distance in kilometres, falling back to the default for unknown pairs.
    pub fn get_distance(&self, origin: &str, destination: &str) -> u32 {
        self.data
            .distances
            .get(origin, destination)
            .unwrap_or(self.data.default_distance_km)
    }

    /// Price a trip at full precision. Fails instead of overflowing when the
    /// configured fare and distance are too large to represent.
    pub fn calculate_fare(
        &self,
        distance_km: u32,
        bus_type: &BusType,
        passenger_count: usize,
    ) -> Result<FareBreakdown, BookingError> {
        let overflow = || {
            BookingError::BookingFailed(format!(
                "fare for {passenger_count} passengers over {distance_km} km on {} overflows",
                bus_type.name
            ))
        };
        let base_fare = Decimal::from(distance_km)
            .checked_mul(bus_type.fare_per_km)
            .and_then(|fare| fare.checked_mul(Decimal::from(passenger_count)))
            .ok_or_else(overflow)?;
        let service_tax = base_fare
            .checked_mul(SERVICE_TAX_RATE)
            .ok_or_else(overflow)?;
        let total_amount = base_fare.checked_add(service_tax).ok_or_else(overflow)?;
        Ok(FareBreakdown {
            distance_km,
            passenger_count,
            base_fare,
            service_tax,
            total_amount,
        })
    }

    /// `KSRTC` followed by eight random digits.
    ///
    /// Uniqueness is probabilistic only. Enable [`Self::with_unique_ids`] to
    /// reject repeats within this engine's lifetime.
    pub fn generate_ticket_number(&mut self) -> String {
        format!("{TICKET_PREFIX}{}", random_digits(&mut self.rng, 8))
    }

    /// `KA`, two digits, `F`, four digits (e.g. `KA07F1234`).
    pub fn generate_bus_number(&mut self) -> String {
        format!(
            "{BUS_PREFIX}{}{BUS_SERIES}{}",
            random_digits(&mut self.rng, 2),
            random_digits(&mut self.rng, 4)
        )
    }

    /// Price a validated request and issue a ticket for it. The fare comes
    /// from the configured bus type of the same name, never from the request.
    pub fn build_ticket(&mut self, mut request: BookingRequest) -> Result<Ticket, BookingError> {
        let passenger_count = request.passengers.len();
        if !(1..=MAX_PASSENGERS).contains(&passenger_count) {
            return Err(BookingError::BookingFailed(format!(
                "request carries {passenger_count} passengers"
            )));
        }
        let Some(bus_type) = self.data.bus_type(&request.bus_type.name).cloned() else {
            return Err(BookingError::BookingFailed(format!(
                "bus type {} is not configured",
                request.bus_type.name
            )));
        };

        let distance = self.get_distance(&request.origin, &request.destination);
        let fare = self.calculate_fare(distance, &bus_type, passenger_count)?;
        request.bus_type = bus_type;
        let ticket_number = self.issue(IdKind::Ticket)?;
        let bus_number = self.issue(IdKind::Bus)?;

        info!(
            ticket = %ticket_number,
            bus = %bus_number,
            origin = %request.origin,
            destination = %request.destination,
            passengers = passenger_count,
            total = %fare.total_amount,
            "Ticket issued"
        );

        Ok(Ticket {
            ticket_number,
            bus_number,
            issued_at: self.clock.now(),
            request,
            fare,
        })
    }

    fn issue(&mut self, kind: IdKind) -> Result<String, BookingError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = match kind {
                IdKind::Ticket => self.generate_ticket_number(),
                IdKind::Bus => self.generate_bus_number(),
            };
            let Some(issued) = self.issued.as_mut() else {
                return Ok(id);
            };
            let seen = match kind {
                IdKind::Ticket => &mut issued.tickets,
                IdKind::Bus => &mut issued.buses,
            };
            if seen.insert(id.clone()) {
                return Ok(id);
            }
            warn!(id = %id, ?kind, "Identifier collision, redrawing");
        }
        Err(BookingError::BookingFailed(format!(
            "could not draw an unused {kind:?} number after {MAX_ID_ATTEMPTS} attempts"
        )))
    }
}

#[derive(Debug, Clone, Copy)]
enum IdKind {
    Ticket,
    Bus,
}

fn random_digits(rng: &mut impl Rng, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Capitalise the first letter of every alphabetic run and lowercase the
/// rest, after trimming (`"new  DELHI"` -> `"New  Delhi"`).
pub fn title_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.trim().chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                result.extend(ch.to_uppercase());
            } else {
                result.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(ch);
            at_word_start = true;
        }
    }
    result
}
