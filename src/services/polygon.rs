//! Polygon.io RSI endpoint client

use crate::error::IndicatorError;
use crate::models::{IndicatorReading, RSI_WINDOW};
use crate::services::market_data::IndicatorProvider;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct RsiResponse {
    status: String,
    #[serde(default)]
    results: Option<RsiResults>,
}

#[derive(Debug, Deserialize)]
struct RsiResults {
    #[serde(default)]
    values: Vec<RsiValue>,
}

#[derive(Debug, Deserialize)]
struct RsiValue {
    value: f64,
    timestamp: i64,
}

pub struct PolygonRsiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl PolygonRsiClient {
    /// Build a client with its own connection pool and a per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(endpoint, api_key, client))
    }

    pub fn with_client(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url_for(&self, ticker: &str) -> String {
        format!("{}/{}", self.endpoint, ticker)
    }

    async fn request(&self, ticker: &str) -> Result<IndicatorReading, IndicatorError> {
        let window = RSI_WINDOW.to_string();
        debug!(ticker = %ticker, "fetching RSI for {}", ticker);

        let response = self
            .client
            .get(self.url_for(ticker))
            .query(&[
                ("timespan", "day"),
                ("adjusted", "true"),
                ("window", window.as_str()),
                ("series_type", "close"),
                ("order", "desc"),
                ("limit", "1"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|source| IndicatorError::Transport {
                ticker: ticker.to_string(),
                source,
            })?;

        if response.status() != StatusCode::OK {
            return Err(IndicatorError::Status {
                ticker: ticker.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| IndicatorError::Transport {
                ticker: ticker.to_string(),
                source,
            })?;

        parse_rsi_body(ticker, &body)
    }
}

/// Extract the most recent value from an RSI response body.
pub fn parse_rsi_body(ticker: &str, body: &str) -> Result<IndicatorReading, IndicatorError> {
    let parsed: RsiResponse =
        serde_json::from_str(body).map_err(|e| IndicatorError::Malformed {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        })?;

    if parsed.status != "OK" {
        return Err(IndicatorError::NoData {
            ticker: ticker.to_string(),
        });
    }

    parsed
        .results
        .and_then(|r| r.values.into_iter().next())
        .map(|latest| IndicatorReading::new(ticker, latest.value, latest.timestamp))
        .ok_or_else(|| IndicatorError::NoData {
            ticker: ticker.to_string(),
        })
}

#[async_trait]
impl IndicatorProvider for PolygonRsiClient {
    async fn latest_rsi(&self, ticker: &str) -> Result<IndicatorReading, IndicatorError> {
        let result = self.request(ticker).await;
        if let Err(ref e) = result {
            warn!(ticker = %e.ticker(), error = %e, "failed to fetch RSI for {}", ticker);
        }
        result
    }
}
