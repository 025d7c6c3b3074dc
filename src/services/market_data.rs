//! Indicator provider interface and the per-cycle fan-out.

use crate::error::IndicatorError;
use crate::models::IndicatorReading;
use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, info};

#[async_trait]
pub trait IndicatorProvider: Send + Sync {
    /// Latest 14-period daily RSI for a ticker.
    async fn latest_rsi(&self, ticker: &str) -> Result<IndicatorReading, IndicatorError>;
}

/// Request every ticker at once and wait for all of them.
///
/// Returns one entry per input ticker, in input order. Failures are left in place
/// so the caller can count them; they have already been logged by the provider.
pub async fn fetch_latest_readings<P>(
    provider: &P,
    tickers: &[String],
) -> Vec<Result<IndicatorReading, IndicatorError>>
where
    P: IndicatorProvider + ?Sized,
{
    debug!(count = tickers.len(), "fanning out RSI requests");

    let results = join_all(tickers.iter().map(|ticker| provider.latest_rsi(ticker))).await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(
        requested = tickers.len(),
        succeeded = tickers.len() - failed,
        failed = failed,
        "RSI fan-out complete: {} of {} tickers returned data",
        tickers.len() - failed,
        tickers.len()
    );

    results
}
