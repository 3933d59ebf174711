//! Per-line performance and the Union Station board

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::routes::route_name;
use super::{decode, lenient_string, DecodeError};

/// Performance of one train line or bus route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStat {
    #[serde(rename = "Code", deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(rename = "Total", default)]
    pub total: u32,
    #[serde(rename = "OnTime", default)]
    pub on_time: u32,
    #[serde(rename = "Delayed", default)]
    pub delayed: u32,
}

impl LineStat {
    pub fn name(&self) -> String {
        route_name(&self.code)
    }

    /// On-time share in percent, rounded to one decimal; `None` with no vehicles
    pub fn on_time_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((f64::from(self.on_time) / f64::from(self.total) * 1000.0).round() / 10.0)
    }
}

/// The decoded `lines` payload for one vehicle class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinesBoard {
    pub lines: Vec<LineStat>,
}

impl LinesBoard {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let lines: Vec<LineStat> = decode(value)?;
        Ok(Self { lines })
    }

    /// The `n` lines with the most vehicles, busiest first
    pub fn top_by_total(&self, n: usize) -> Vec<&LineStat> {
        let mut lines: Vec<&LineStat> = self.lines.iter().collect();
        // Stable sort keeps feed order among ties
        lines.sort_by(|a, b| b.total.cmp(&a.total));
        lines.truncate(n);
        lines
    }

    pub fn busiest(&self) -> Option<&LineStat> {
        self.top_by_total(1).into_iter().next()
    }

    /// Number of lines reporting no delayed vehicles
    pub fn routes_without_delays(&self) -> usize {
        self.lines.iter().filter(|l| l.delayed == 0).count()
    }

    pub fn total_vehicles(&self) -> u32 {
        self.lines.iter().map(|l| l.total).sum()
    }
}

/// Union Station departures as loosely-typed rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionBoard {
    pub rows: Vec<Map<String, Value>>,
}

impl UnionBoard {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let rows: Vec<Map<String, Value>> = decode(value)?;
        Ok(Self { rows })
    }

    /// Column names taken from the first row
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Display text for one cell; missing cells are blank
    pub fn cell(row: &Map<String, Value>, column: &str) -> String {
        match row.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}
