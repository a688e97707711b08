// Reading domain model
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Format used for timeline categories (second precision).
pub const TIMELINE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// One tracked measurement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Humidity,
    Pressure,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Humidity, Metric::Pressure, Metric::Temperature];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
            Metric::Temperature => "temperature",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// Why a raw row could not become a [`Reading`]. Rows failing this way are skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),
    #[error("field `{0}` is not a number")]
    InvalidValue(String),
}

/// One timestamped, sensor-attributed observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Reading {
    pub fn new(id: impl Into<String>, timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            id: id.into(),
            timestamp,
            value,
        }
    }

    /// Timestamp rendered as a timeline category.
    pub fn timeline_key(&self) -> String {
        self.timestamp.format(TIMELINE_FORMAT).to_string()
    }
}
