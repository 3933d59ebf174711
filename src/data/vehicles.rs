//! Live vehicle positions, search filters and breakdowns
//!
//! Decodes the `vehicles` payload and implements the tracker's search modes:
//! route code, trip number, status and a lat/lon bounding box, combined with
//! vehicle-type and moving-only filters. Filtered vehicles can be sorted by
//! trip number, route name, status or type.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::routes::route_name;
use super::{decode, lenient_string, DecodeError};

/// Vehicle class as reported by the feed's `Type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleType {
    Train,
    Bus,
    Other,
}

impl VehicleType {
    fn from_feed(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" => VehicleType::Train,
            "bus" => VehicleType::Bus,
            _ => VehicleType::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::Train => "Train",
            VehicleType::Bus => "Bus",
            VehicleType::Other => "Other",
        }
    }
}

/// A single tracked vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "Latitude", default)]
    pub latitude: f64,
    #[serde(rename = "Longitude", default)]
    pub longitude: f64,
    #[serde(rename = "Status", default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(
        rename = "Line",
        alias = "RouteCode",
        default,
        deserialize_with = "lenient_string"
    )]
    pub line: String,
    #[serde(rename = "TripNumber", default, deserialize_with = "lenient_string")]
    pub trip_number: String,
    #[serde(rename = "IsInMotion", default)]
    pub is_in_motion: bool,
    #[serde(rename = "Display", default, deserialize_with = "lenient_string")]
    pub display: String,
}

impl Vehicle {
    pub fn vehicle_type(&self) -> VehicleType {
        VehicleType::from_feed(&self.kind)
    }

    /// Full route name for the vehicle's line code
    pub fn route_name(&self) -> String {
        route_name(&self.line)
    }

    /// Vehicles without a position fix are reported at (0, 0)
    pub fn has_location(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }

    pub fn is_on_time(&self) -> bool {
        contains_ignore_case(&self.status, "on time")
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The decoded `vehicles` payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclesBoard {
    pub vehicles: Vec<Vehicle>,
}

#[derive(Deserialize)]
struct VehiclesResponse {
    vehicles: Vec<Vehicle>,
}

impl VehiclesBoard {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let response: VehiclesResponse = decode(value)?;
        Ok(Self {
            vehicles: response.vehicles,
        })
    }
}

/// Status values offered by the status search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    OnTime,
    Delayed,
    Early,
}

impl StatusFilter {
    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All Statuses",
            StatusFilter::OnTime => "On Time",
            StatusFilter::Delayed => "Delayed",
            StatusFilter::Early => "Early",
        }
    }

    /// Next value in selection order, wrapping around
    pub fn next(&self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::OnTime,
            StatusFilter::OnTime => StatusFilter::Delayed,
            StatusFilter::Delayed => StatusFilter::Early,
            StatusFilter::Early => StatusFilter::All,
        }
    }
}

/// Inclusive latitude/longitude box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for LocationBounds {
    /// Roughly the Greater Toronto and Hamilton Area
    fn default() -> Self {
        Self {
            min_lat: 43.0,
            max_lat: 44.0,
            min_lon: -80.0,
            max_lon: -78.0,
        }
    }
}

impl LocationBounds {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Active search criterion; only one applies at a time
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchMode {
    #[default]
    All,
    /// Exact line code match, case-insensitive
    RouteCode(String),
    /// Substring of the trip number, case-insensitive
    TripNumber(String),
    Status(StatusFilter),
    Location(LocationBounds),
}

impl SearchMode {
    pub fn label(&self) -> String {
        match self {
            SearchMode::All => "Show All".to_string(),
            SearchMode::RouteCode(code) => format!("Route Code: {}", code),
            SearchMode::TripNumber(trip) => format!("Trip Number: {}", trip),
            SearchMode::Status(status) => format!("Status: {}", status.label()),
            SearchMode::Location(b) => format!(
                "Location: {:.2}..{:.2}, {:.2}..{:.2}",
                b.min_lat, b.max_lat, b.min_lon, b.max_lon
            ),
        }
    }
}

/// Filters applied to the vehicle list
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleFilter {
    pub include_trains: bool,
    pub include_buses: bool,
    pub moving_only: bool,
    pub mode: SearchMode,
}

impl Default for VehicleFilter {
    fn default() -> Self {
        Self {
            include_trains: true,
            include_buses: true,
            moving_only: false,
            mode: SearchMode::All,
        }
    }
}

impl VehicleFilter {
    /// Whether a vehicle passes every active criterion
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.matches_type(vehicle)
            && (!self.moving_only || vehicle.is_in_motion)
            && self.matches_mode(vehicle)
    }

    fn matches_type(&self, vehicle: &Vehicle) -> bool {
        // With no type selected the type filter is off, not "match nothing"
        if !self.include_trains && !self.include_buses {
            return true;
        }
        match vehicle.vehicle_type() {
            VehicleType::Train => self.include_trains,
            VehicleType::Bus => self.include_buses,
            VehicleType::Other => false,
        }
    }

    fn matches_mode(&self, vehicle: &Vehicle) -> bool {
        match &self.mode {
            SearchMode::All => true,
            SearchMode::RouteCode(code) => {
                let code = code.trim().to_uppercase();
                code.is_empty() || vehicle.line.to_uppercase() == code
            }
            SearchMode::TripNumber(trip) => {
                let trip = trip.trim();
                trip.is_empty() || contains_ignore_case(&vehicle.trip_number, trip)
            }
            SearchMode::Status(StatusFilter::All) => true,
            SearchMode::Status(status) => contains_ignore_case(&vehicle.status, status.label()),
            SearchMode::Location(bounds) => bounds.contains(vehicle.latitude, vehicle.longitude),
        }
    }

    /// Returns the vehicles that pass the filter, in feed order
    pub fn apply<'a>(&self, vehicles: &'a [Vehicle]) -> Vec<&'a Vehicle> {
        vehicles.iter().filter(|v| self.matches(v)).collect()
    }
}

/// Column the vehicle table is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    TripNumber,
    RouteName,
    Status,
    Type,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::TripNumber => "Trip Number",
            SortKey::RouteName => "Route Name",
            SortKey::Status => "Status",
            SortKey::Type => "Type",
        }
    }

    /// Next key in selection order, wrapping around
    pub fn next(&self) -> Self {
        match self {
            SortKey::TripNumber => SortKey::RouteName,
            SortKey::RouteName => SortKey::Status,
            SortKey::Status => SortKey::Type,
            SortKey::Type => SortKey::TripNumber,
        }
    }

    fn compare(&self, a: &Vehicle, b: &Vehicle) -> Ordering {
        match self {
            SortKey::TripNumber => compare_trip_numbers(&a.trip_number, &b.trip_number),
            SortKey::RouteName => a.route_name().cmp(&b.route_name()),
            SortKey::Status => a.status.cmp(&b.status),
            SortKey::Type => a.kind.cmp(&b.kind),
        }
    }
}

/// Numeric trip numbers compare by value and sort before non-numeric ones
fn compare_trip_numbers(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u64>(), b.trim().parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Ordering of the vehicle table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleSort {
    pub key: SortKey,
    pub ascending: bool,
}

impl Default for VehicleSort {
    fn default() -> Self {
        Self {
            key: SortKey::TripNumber,
            ascending: true,
        }
    }
}

impl VehicleSort {
    pub fn label(&self) -> String {
        let order = if self.ascending { "asc" } else { "desc" };
        format!("Sort: {} {}", self.key.label(), order)
    }

    /// Sorts in place; equal keys keep their feed order in both directions
    pub fn sort(&self, vehicles: &mut [&Vehicle]) {
        vehicles.sort_by(|a, b| {
            let ordering = self.key.compare(a, b);
            if self.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

/// Counts of a label, most frequent first
pub fn value_counts<I, S>(labels: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label.into()).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Aggregates over a filtered vehicle list
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSummary {
    /// Vehicles that passed the filter
    pub found: usize,
    /// Vehicles removed by the filter
    pub filtered_out: usize,
    pub trains: usize,
    pub buses: usize,
    pub moving: usize,
    pub on_time: usize,
    pub status_counts: Vec<(String, usize)>,
    /// Up to five busiest routes by name
    pub top_routes: Vec<(String, usize)>,
    /// Vehicles with a position fix
    pub located: usize,
    /// Mean position of located vehicles as `(lat, lon)`
    pub center: Option<(f64, f64)>,
}

impl VehicleSummary {
    pub fn new(filtered: &[&Vehicle], original_count: usize) -> Self {
        let count = |pred: fn(&Vehicle) -> bool| filtered.iter().filter(|v| pred(**v)).count();

        let located: Vec<&&Vehicle> = filtered.iter().filter(|v| v.has_location()).collect();
        let center = if located.is_empty() {
            None
        } else {
            let n = located.len() as f64;
            let lat = located.iter().map(|v| v.latitude).sum::<f64>() / n;
            let lon = located.iter().map(|v| v.longitude).sum::<f64>() / n;
            Some((lat, lon))
        };

        let mut top_routes = value_counts(filtered.iter().map(|v| v.route_name()));
        top_routes.truncate(5);

        Self {
            found: filtered.len(),
            filtered_out: original_count.saturating_sub(filtered.len()),
            trains: count(|v| v.vehicle_type() == VehicleType::Train),
            buses: count(|v| v.vehicle_type() == VehicleType::Bus),
            moving: count(|v| v.is_in_motion),
            on_time: count(|v| v.is_on_time()),
            status_counts: value_counts(filtered.iter().map(|v| v.status.clone())),
            top_routes,
            located: located.len(),
            center,
        }
    }
}
