//! Static reference data: route graph, distance table and bus-type fares.

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::Path,
};

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::BusType;

/// Distance charged for any city pair missing from the table.
pub const DEFAULT_DISTANCE_KM: u32 = 200;

/// Permitted destinations from one origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Departure city.
    pub origin: String,
    /// Cities reachable from `origin`, in display order.
    pub destinations: Vec<String>,
}

/// Directional reachability between cities.
///
/// Edges are not symmetrised: `A -> B` being present says nothing about
/// `B -> A`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteGraph {
    routes: Vec<Route>,
}

impl RouteGraph {
    /// Build a graph from ordered routes.
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// All routes in configured order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Origin city names in configured order.
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.origin.as_str())
    }

    /// Destinations for `origin`, or `None` when it is not a known origin.
    pub fn destinations(&self, origin: &str) -> Option<&[String]> {
        self.routes
            .iter()
            .find(|route| route.origin == origin)
            .map(|route| route.destinations.as_slice())
    }

    /// Whether `origin -> destination` is a permitted edge.
    pub fn reaches(&self, origin: &str, destination: &str) -> bool {
        self.destinations(origin)
            .map(|destinations| destinations.iter().any(|city| city == destination))
            .unwrap_or(false)
    }
}

/// One undirected distance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distance {
    /// One end of the pair.
    pub from: String,
    /// The other end of the pair.
    pub to: String,
    /// Road distance in kilometres.
    pub km: u32,
}

/// Distances keyed by unordered city pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Distance>", into = "Vec<Distance>")]
pub struct DistanceTable {
    entries: Vec<Distance>,
    index: HashMap<(String, String), u32>,
}

impl DistanceTable {
    /// Exact lookup, trying `(a, b)` before `(b, a)`.
    pub fn get(&self, a: &str, b: &str) -> Option<u32> {
        self.index
            .get(&(a.to_string(), b.to_string()))
            .or_else(|| self.index.get(&(b.to_string(), a.to_string())))
            .copied()
    }

    /// Entries in configured order.
    pub fn entries(&self) -> &[Distance] {
        &self.entries
    }
}

impl From<Vec<Distance>> for DistanceTable {
    fn from(entries: Vec<Distance>) -> Self {
        let index = entries
            .iter()
            .map(|entry| ((entry.from.clone(), entry.to.clone()), entry.km))
            .collect();
        Self { entries, index }
    }
}

impl From<DistanceTable> for Vec<Distance> {
    fn from(table: DistanceTable) -> Self {
        table.entries
    }
}

/// Read-only configuration the engine is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Directional route graph.
    pub routes: RouteGraph,
    /// Bus types in display order.
    pub bus_types: Vec<BusType>,
    /// Known city-pair distances.
    pub distances: DistanceTable,
    /// Distance charged for pairs missing from `distances`.
    #[serde(default = "default_distance_km")]
    pub default_distance_km: u32,
}

fn default_distance_km() -> u32 {
    DEFAULT_DISTANCE_KM
}

impl ReferenceData {
    /// Load reference data from a JSON document and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read reference data {}", path.display()))?;
        let data: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse reference data {}", path.display()))?;
        data.validate()
            .with_context(|| format!("invalid reference data in {}", path.display()))?;
        Ok(data)
    }

    /// Reject tables that would make fares or distances meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.bus_types.is_empty() {
            bail!("no bus types configured");
        }
        let mut names = HashSet::new();
        for bus_type in &self.bus_types {
            if bus_type.fare_per_km <= Decimal::ZERO {
                bail!("bus type {} has a non-positive fare", bus_type.name);
            }
            if !names.insert(bus_type.name.as_str()) {
                bail!("duplicate bus type {}", bus_type.name);
            }
        }

        let mut origins = HashSet::new();
        for origin in self.routes.origins() {
            if !origins.insert(origin) {
                bail!("duplicate route origin {origin}");
            }
        }

        if self.default_distance_km == 0 {
            bail!("default distance must be positive");
        }
        if let Some(entry) = self.distances.entries().iter().find(|entry| entry.km == 0) {
            bail!("distance {} - {} must be positive", entry.from, entry.to);
        }
        Ok(())
    }

    /// Look up a bus type by its exact configured name.
    pub fn bus_type(&self, name: &str) -> Option<&BusType> {
        self.bus_types.iter().find(|bus_type| bus_type.name == name)
    }

    /// Configured bus-type names in display order.
    pub fn bus_type_names(&self) -> Vec<String> {
        self.bus_types
            .iter()
            .map(|bus_type| bus_type.name.clone())
            .collect()
    }
}

impl Default for ReferenceData {
    /// The KSRTC sample network.
    fn default() -> Self {
        let route = |origin: &str, destinations: &[&str]| Route {
            origin: origin.to_string(),
            destinations: destinations.iter().map(|city| city.to_string()).collect(),
        };
        let distance = |from: &str, to: &str, km: u32| Distance {
            from: from.to_string(),
            to: to.to_string(),
            km,
        };

        Self {
            routes: RouteGraph::new(vec![
                route(
                    "Bangalore",
                    &[
                        "Mysore",
                        "Mangalore",
                        "Hubli",
                        "Hassan",
                        "Tumkur",
                        "Kolar",
                        "Devanahalli",
                    ],
                ),
                route(
                    "Mysore",
                    &["Bangalore", "Mangalore", "Ooty", "Hassan", "Coorg"],
                ),
                route(
                    "Mangalore",
                    &["Bangalore", "Mysore", "Udupi", "Karwar", "Gokarna"],
                ),
                route(
                    "Hubli",
                    &["Bangalore", "Belgaum", "Bijapur", "Gadag", "Haveri"],
                ),
                route(
                    "Hassan",
                    &["Bangalore", "Mysore", "Chikmagalur", "Belur", "Halebid"],
                ),
            ]),
            bus_types: vec![
                BusType::new("Ordinary", Decimal::new(12, 1), "Basic seating"),
                BusType::new(
                    "Express",
                    Decimal::new(15, 1),
                    "Comfortable seating, faster travel",
                ),
                BusType::new(
                    "Volvo",
                    Decimal::new(20, 1),
                    "AC, comfortable seating, entertainment",
                ),
                BusType::new(
                    "Sleeper",
                    Decimal::new(25, 1),
                    "Sleeping berths, AC, blankets",
                ),
                BusType::new(
                    "Luxury",
                    Decimal::new(30, 1),
                    "Premium seating, AC, entertainment, meals",
                ),
            ],
            distances: DistanceTable::from(vec![
                distance("Bangalore", "Mysore", 150),
                distance("Bangalore", "Mangalore", 352),
                distance("Bangalore", "Hubli", 410),
                distance("Bangalore", "Hassan", 183),
                distance("Bangalore", "Tumkur", 70),
                distance("Bangalore", "Kolar", 68),
                distance("Mysore", "Mangalore", 250),
                distance("Mysore", "Hassan", 118),
                distance("Mysore", "Coorg", 120),
                distance("Mangalore", "Udupi", 58),
                distance("Mangalore", "Karwar", 260),
                distance("Hubli", "Belgaum", 102),
                distance("Hubli", "Bijapur", 165),
            ]),
            default_distance_km: DEFAULT_DISTANCE_KM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_network_is_valid() -> Result<()> {
        let data = ReferenceData::default();
        data.validate()?;
        assert_eq!(data.routes.origins().count(), 5);
        assert_eq!(data.bus_types.len(), 5);
        assert_eq!(data.distances.entries().len(), 13);
        Ok(())
    }

    #[test]
    fn route_graph_is_directional() {
        let data = ReferenceData::default();
        assert!(data.routes.reaches("Bangalore", "Tumkur"));
        assert!(!data.routes.reaches("Tumkur", "Bangalore"));
        assert!(data.routes.destinations("Tumkur").is_none());
    }

    #[test]
    fn loads_json_reference_data() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("network.json");
        fs::write(
            &path,
            r#"{
  "routes": [{ "origin": "Alpha", "destinations": ["Beta"] }],
  "bus_types": [{ "name": "Shuttle", "fare_per_km": 0.75, "amenities": "Standing room" }],
  "distances": [{ "from": "Alpha", "to": "Beta", "km": 40 }]
}"#,
        )?;

        let data = ReferenceData::load(&path)?;
        assert_eq!(data.default_distance_km, DEFAULT_DISTANCE_KM);
        assert_eq!(data.distances.get("Beta", "Alpha"), Some(40));
        assert_eq!(
            data.bus_type("Shuttle").map(|bus| bus.fare_per_km),
            Some(Decimal::new(75, 2))
        );
        Ok(())
    }

    #[test]
    fn rejects_duplicate_bus_types() {
        let mut data = ReferenceData::default();
        data.bus_types.push(data.bus_types[0].clone());
        assert!(data.validate().is_err());
    }

    #[test]
    fn rejects_zero_distances() {
        let mut data = ReferenceData::default();
        data.distances = DistanceTable::from(vec![Distance {
            from: "Alpha".to_string(),
            to: "Beta".to_string(),
            km: 0,
        }]);
        assert!(data.validate().is_err());
    }

    #[test]
    fn reports_missing_file_with_path() {
        let err = ReferenceData::load("/nonexistent/network.json")
            .expect_err("missing file should fail");
        assert!(err.to_string().contains("/nonexistent/network.json"));
    }
}
