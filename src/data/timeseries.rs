//! 24-hour activity series
//!
//! The `timeseries` endpoint uses the Grafana datapoint layout: each series is a
//! `target` name plus `[value, epoch_ms]` pairs.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, DecodeError};

/// One named series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub target: String,
    /// `(value, epoch milliseconds)`; gaps are reported as `null` values
    pub datapoints: Vec<(Option<f64>, f64)>,
}

impl TimeSeries {
    /// Chart points as `(epoch seconds, value)`, skipping gaps
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.datapoints
            .iter()
            .filter_map(|(value, ms)| value.map(|v| (ms / 1000.0, v)))
            .collect()
    }

    /// Values only, in time order, skipping gaps
    pub fn values(&self) -> Vec<f64> {
        self.datapoints.iter().filter_map(|(value, _)| *value).collect()
    }

    /// The most recent non-null value
    pub fn latest(&self) -> Option<f64> {
        self.datapoints.iter().rev().find_map(|(value, _)| *value)
    }
}

/// All series from one fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendBoard {
    pub series: Vec<TimeSeries>,
}

impl TrendBoard {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let series: Vec<TimeSeries> = decode(value)?;
        Ok(Self { series })
    }

    /// `(min, max)` epoch seconds across all series
    pub fn time_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.series.iter().flat_map(|s| s.points()).map(|(x, _)| x))
    }

    /// `(min, max)` values across all series
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.series.iter().flat_map(|s| s.values()))
    }
}

fn bounds(iter: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    iter.fold(None, |acc, x| match acc {
        None => Some((x, x)),
        Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
    })
}

/// Formats epoch seconds as a local `HH:MM` axis label
pub fn time_label(epoch_secs: f64) -> String {
    let dt: Option<DateTime<Local>> = Local.timestamp_opt(epoch_secs as i64, 0).single();
    dt.map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}
