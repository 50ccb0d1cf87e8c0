#![allow(missing_docs)]

//! Shared domain models.

use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A class of service with its per-passenger, per-kilometre price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusType {
    /// Display name, also the lookup key (e.g. `Volvo`).
    pub name: String,
    /// Price per passenger per kilometre.
    pub fare_per_km: Decimal,
    /// Free-text description of on-board amenities.
    pub amenities: String,
}

impl BusType {
    /// Convenience constructor used by the built-in reference data and tests.
    pub fn new(name: impl Into<String>, fare_per_km: Decimal, amenities: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fare_per_km,
            amenities: amenities.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Others,
}

impl Gender {
    /// All accepted values in prompt order.
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Others];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Others => "OTHERS",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let upper = value.trim().to_uppercase();
        Gender::ALL
            .into_iter()
            .find(|gender| gender.as_str() == upper)
            .ok_or(())
    }
}

/// A validated traveller with an assigned seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    /// `S01`, `S02`, ... in booking order.
    pub seat: String,
}

/// A fully validated booking, ready to be priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub origin: String,
    pub destination: String,
    pub bus_type: BusType,
    pub travel_date: NaiveDate,
    pub travel_time: NaiveTime,
    pub passengers: Vec<Passenger>,
    pub mobile: String,
    pub email: Option<String>,
}

/// Computed price of a booking at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub distance_km: u32,
    pub passenger_count: usize,
    /// `distance × fare_per_km × passengers`.
    pub base_fare: Decimal,
    /// Fixed 5% surcharge on the base fare.
    pub service_tax: Decimal,
    pub total_amount: Decimal,
}

/// An issued ticket. Produced once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_number: String,
    pub bus_number: String,
    pub issued_at: NaiveDateTime,
    pub request: BookingRequest,
    pub fare: FareBreakdown,
}
