//! Network statistics boards
//!
//! Both the GO `stats` endpoint and the TTC `summary` endpoint return a list of
//! `{metric, value}` pairs. Missing metrics read as zero, matching how the
//! dashboard has always presented partial payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode, DecodeError};

/// On-time performance target in percent
pub const PERFORMANCE_TARGET: f64 = 95.0;

/// A single `{metric, value}` pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
    pub metric: String,
    pub value: Value,
}

impl StatRow {
    /// Numeric reading of the value; numeric strings are accepted
    pub fn as_number(&self) -> Option<f64> {
        match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        }
    }

    /// Value formatted for a metric card
    pub fn display_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => "-".to_string(),
            Value::Number(_) => self.as_number().map(format_number).unwrap_or_default(),
            other => other.to_string(),
        }
    }
}

/// Formats a number without a fractional part when it is whole
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{:.1}", n)
    }
}

/// GO Transit network statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsBoard {
    rows: Vec<StatRow>,
}

impl StatsBoard {
    /// Decodes the `stats` payload
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let rows: Vec<StatRow> = decode(value)?;
        Ok(Self { rows })
    }

    /// Reads a metric as a number, defaulting to zero
    pub fn number(&self, metric: &str) -> f64 {
        self.rows
            .iter()
            .find(|row| row.metric == metric)
            .and_then(StatRow::as_number)
            .unwrap_or(0.0)
    }

    pub fn performance_rate(&self) -> f64 {
        self.number("Performance Rate")
    }

    /// Percentage points above (positive) or below the performance target
    pub fn delta_vs_target(&self) -> f64 {
        self.performance_rate() - PERFORMANCE_TARGET
    }

    pub fn meets_target(&self) -> bool {
        self.performance_rate() >= PERFORMANCE_TARGET
    }

    pub fn total_vehicles(&self) -> f64 {
        self.number("Total Vehicles")
    }

    pub fn trains_active(&self) -> f64 {
        self.number("Trains Active")
    }

    pub fn buses_active(&self) -> f64 {
        self.number("Buses Active")
    }

    /// Trains and buses currently in motion
    pub fn moving(&self) -> f64 {
        self.number("Trains in Motion") + self.number("Buses in Motion")
    }

    pub fn on_time(&self) -> f64 {
        self.number("On Time")
    }

    pub fn delayed(&self) -> f64 {
        self.number("Delayed")
    }

    pub fn train_lines(&self) -> f64 {
        self.number("Train Lines")
    }

    pub fn bus_routes(&self) -> f64 {
        self.number("Bus Routes")
    }

    /// On-time vehicles as a rounded share of the fleet
    ///
    /// An empty fleet is treated as one vehicle so the share is always defined.
    pub fn on_time_share(&self) -> i64 {
        let total = self.total_vehicles();
        let total = if total == 0.0 { 1.0 } else { total };
        (self.on_time() / total * 100.0).round() as i64
    }
}

/// TTC network summary, kept in the order the API returned it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryBoard {
    rows: Vec<StatRow>,
}

impl SummaryBoard {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let rows: Vec<StatRow> = decode(value)?;
        Ok(Self { rows })
    }

    /// `(metric, display value)` pairs in API order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|row| (row.metric.clone(), row.display_value()))
            .collect()
    }
}
