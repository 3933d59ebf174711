//! Core data models for the transit dashboard
//!
//! The cache stores raw JSON per endpoint. This module decodes those values into
//! typed boards and provides the aggregations the pages display.

pub mod alerts;
pub mod lines;
pub mod routes;
pub mod stats;
pub mod timeseries;
pub mod vehicles;

pub use alerts::{Alert, AlertsBoard, Severity};
pub use lines::{LineStat, LinesBoard, UnionBoard};
pub use routes::route_name;
pub use stats::{StatRow, StatsBoard, SummaryBoard};
pub use timeseries::{TimeSeries, TrendBoard};
pub use vehicles::{
    LocationBounds, SearchMode, SortKey, StatusFilter, Vehicle, VehicleFilter, VehicleSort,
    VehicleSummary, VehicleType, VehiclesBoard,
};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Errors raised when a response does not have the expected shape
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The JSON did not match the model (wrong type, missing required field)
    #[error("Unexpected response shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Decodes a cached JSON value into a model type
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, DecodeError> {
    Ok(T::deserialize(value)?)
}

/// Accepts strings, numbers and null for fields the feed types inconsistently
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// The presentation state of one data source on a page
///
/// Each source is loaded independently, so one failing endpoint only degrades
/// its own section.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Section<T> {
    /// Nothing fetched yet
    #[default]
    Loading,
    /// Current data
    Ready {
        value: T,
        fetched_at: DateTime<Utc>,
    },
    /// The latest fetch failed; showing the last good data instead
    Stale {
        value: T,
        fetched_at: DateTime<Utc>,
        error: String,
    },
    /// No data could be loaded
    Unavailable(String),
}

impl<T> Section<T> {
    /// The data to render, current or stale
    pub fn value(&self) -> Option<&T> {
        match self {
            Section::Ready { value, .. } | Section::Stale { value, .. } => Some(value),
            Section::Loading | Section::Unavailable(_) => None,
        }
    }

    /// The failure to surface, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            Section::Stale { error, .. } | Section::Unavailable(error) => Some(error.as_str()),
            Section::Loading | Section::Ready { .. } => None,
        }
    }

    /// When the displayed data was fetched
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Section::Ready { fetched_at, .. } | Section::Stale { fetched_at, .. } => {
                Some(*fetched_at)
            }
            Section::Loading | Section::Unavailable(_) => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Section::Stale { .. })
    }
}
