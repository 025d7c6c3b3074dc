//! Error types for each stage of the alert cycle

use thiserror::Error;

/// Failure to obtain a reading for a single ticker. Never escapes the fan-out.
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("request for {ticker} failed: {source}")]
    Transport {
        ticker: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} for {ticker}")]
    Status { ticker: String, status: u16 },

    #[error("malformed RSI response for {ticker}: {reason}")]
    Malformed { ticker: String, reason: String },

    #[error("no valid RSI data returned for {ticker}")]
    NoData { ticker: String },
}

impl IndicatorError {
    pub fn ticker(&self) -> &str {
        match self {
            Self::Transport { ticker, .. }
            | Self::Status { ticker, .. }
            | Self::Malformed { ticker, .. }
            | Self::NoData { ticker } => ticker,
        }
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook responded with status {0}")]
    Status(u16),

    #[error("failed to read attachment: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TickerSourceError {
    #[error("ticker listing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ticker listing responded with status {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to run browser: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser exited with {status}: {stderr}")]
    Browser { status: String, stderr: String },

    #[error("browser did not write screenshot to {0}")]
    MissingOutput(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Anything that aborts a whole cycle. Caught and logged by the scheduler.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Tickers(#[from] TickerSourceError),

    #[error("cycle panicked: {0}")]
    Panicked(String),
}
