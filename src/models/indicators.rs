use serde::{Deserialize, Serialize};

/// RSI lookback, in daily periods.
pub const RSI_WINDOW: u32 = 14;

/// Latest RSI value for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub ticker: String,
    pub value: f64,
    /// Epoch milliseconds of the bar the value was computed for.
    pub timestamp: i64,
}

impl IndicatorReading {
    pub fn new(ticker: impl Into<String>, value: f64, timestamp: i64) -> Self {
        Self {
            ticker: ticker.into(),
            value,
            timestamp,
        }
    }
}
