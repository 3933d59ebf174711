//! TTC service alerts

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::vehicles::value_counts;
use super::{decode, lenient_string, DecodeError};

/// Number of alerts shown on the alerts page
pub const ALERTS_SHOWN: usize = 15;

/// Alert severity bucket used for highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
    Other,
}

/// One alert row; fields beyond severity and type are kept as-is for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "Severity", deserialize_with = "lenient_string")]
    pub severity: String,
    #[serde(rename = "Type", deserialize_with = "lenient_string")]
    pub alert_type: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Alert {
    pub fn severity_level(&self) -> Severity {
        match self.severity.as_str() {
            "High" => Severity::High,
            "Medium" => Severity::Medium,
            "Low" => Severity::Low,
            _ => Severity::Other,
        }
    }

    /// Text of an extra field, blank when absent
    pub fn detail(&self, field: &str) -> String {
        match self.details.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertsBoard {
    pub alerts: Vec<Alert>,
}

impl AlertsBoard {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let alerts: Vec<Alert> = decode(value)?;
        Ok(Self { alerts })
    }

    /// The alerts shown on the page, in feed order
    pub fn shown(&self) -> &[Alert] {
        &self.alerts[..self.alerts.len().min(ALERTS_SHOWN)]
    }

    /// Detail column names across the shown alerts, sorted
    pub fn detail_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .shown()
            .iter()
            .flat_map(|a| a.details.keys().cloned())
            .collect();
        columns.sort();
        columns.dedup();
        columns
    }

    pub fn by_type(&self) -> Vec<(String, usize)> {
        value_counts(self.shown().iter().map(|a| a.alert_type.clone()))
    }

    pub fn by_severity(&self) -> Vec<(String, usize)> {
        value_counts(self.shown().iter().map(|a| a.severity.clone()))
    }
}
