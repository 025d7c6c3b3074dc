//! Ticker universe: where symbols come from and which ones are worth scanning.

use crate::error::TickerSourceError;
use async_trait::async_trait;
use tracing::{debug, info};

#[async_trait]
pub trait TickerSource: Send + Sync {
    /// Raw candidate symbols, unfiltered.
    async fn fetch_tickers(&self) -> Result<Vec<String>, TickerSourceError>;
}

/// Keep plain equity symbols: uppercase letters only, no index (`^`) or class (`/`) markers.
pub fn filter_tickers<S: AsRef<str>>(tickers: &[S]) -> Vec<String> {
    tickers
        .iter()
        .map(AsRef::as_ref)
        .filter(|t| is_plain_ticker(t))
        .map(str::to_string)
        .collect()
}

fn is_plain_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && !ticker.contains('^')
        && !ticker.contains('/')
        && ticker.chars().all(|c| c.is_ascii_uppercase())
}

/// Fixed list, typically from the `TICKERS` variable.
pub struct StaticTickerSource {
    tickers: Vec<String>,
}

impl StaticTickerSource {
    pub fn new(tickers: Vec<String>) -> Self {
        Self { tickers }
    }
}

#[async_trait]
impl TickerSource for StaticTickerSource {
    async fn fetch_tickers(&self) -> Result<Vec<String>, TickerSourceError> {
        Ok(self.tickers.clone())
    }
}

/// Nasdaq Trader symbol directory (`nasdaqlisted.txt`).
pub struct NasdaqTickerSource {
    client: reqwest::Client,
    url: String,
}

impl NasdaqTickerSource {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TickerSource for NasdaqTickerSource {
    async fn fetch_tickers(&self) -> Result<Vec<String>, TickerSourceError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(TickerSourceError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let tickers = parse_symbol_directory(&body);
        info!(count = tickers.len(), url = %self.url, "fetched Nasdaq listing");
        Ok(tickers)
    }
}

/// Parse the pipe-delimited symbol directory, skipping the header, the
/// `File Creation Time` trailer and test issues.
pub fn parse_symbol_directory(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("Symbol|") && !line.starts_with("File Creation Time"))
        .filter_map(|line| {
            let columns: Vec<&str> = line.split('|').collect();
            let symbol = columns.first()?.trim();
            if columns.get(3).map(|c| c.trim()) == Some("Y") {
                debug!(symbol = %symbol, "skipping test issue");
                return None;
            }
            (!symbol.is_empty()).then(|| symbol.to_string())
        })
        .collect()
}
