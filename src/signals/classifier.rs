//! Overbought/oversold classification of RSI readings

use crate::config::Config;
use crate::models::{IndicatorReading, Perspective, RsiStatus};
use std::collections::HashSet;
use tracing::debug;

/// Threshold bands and which of them are reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub overbought: f64,
    pub oversold: f64,
    pub show_overbought: bool,
    pub show_oversold: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            overbought: 70.0,
            oversold: 30.0,
            show_overbought: true,
            show_oversold: true,
        }
    }
}

impl Thresholds {
    pub fn from_config(config: &Config) -> Self {
        Self {
            overbought: config.rsi_overbought as f64,
            oversold: config.rsi_oversold as f64,
            show_overbought: config.show_overbought,
            show_oversold: config.show_oversold,
        }
    }

    /// Status for a single value. Values equal to a threshold are neutral.
    pub fn status_of(&self, value: f64) -> Option<RsiStatus> {
        if self.show_overbought && value > self.overbought {
            Some(RsiStatus::Overbought)
        } else if self.show_oversold && value < self.oversold {
            Some(RsiStatus::Oversold)
        } else {
            None
        }
    }
}

pub struct Classifier {
    thresholds: Thresholds,
}

impl Classifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Perspectives for out-of-band readings, in input order. Later duplicates of a ticker are ignored.
    pub fn classify(&self, readings: &[IndicatorReading]) -> Vec<Perspective> {
        let mut seen = HashSet::new();
        let mut perspectives = Vec::new();

        for reading in readings {
            if !seen.insert(reading.ticker.as_str()) {
                debug!(ticker = %reading.ticker, "duplicate reading ignored");
                continue;
            }

            match self.thresholds.status_of(reading.value) {
                Some(status) => perspectives.push(Perspective::new(
                    reading.ticker.clone(),
                    reading.value,
                    status,
                    reading.timestamp,
                )),
                None => debug!(
                    ticker = %reading.ticker,
                    rsi = reading.value,
                    "{}: RSI {:.2} is within normal range",
                    reading.ticker,
                    reading.value
                ),
            }
        }

        perspectives
    }
}
