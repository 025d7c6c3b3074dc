use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsiStatus {
    Overbought,
    Oversold,
}

impl RsiStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsiStatus::Overbought => "Overbought",
            RsiStatus::Oversold => "Oversold",
        }
    }
}

impl fmt::Display for RsiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An out-of-band reading tagged with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    pub ticker: String,
    pub value: f64,
    pub status: RsiStatus,
    pub timestamp: i64,
}

impl Perspective {
    pub fn new(ticker: impl Into<String>, value: f64, status: RsiStatus, timestamp: i64) -> Self {
        Self {
            ticker: ticker.into(),
            value,
            status,
            timestamp,
        }
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}
