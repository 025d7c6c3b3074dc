//! External collaborators: market data, ticker listings, webhook delivery, screenshots.

pub mod discord;
pub mod heatmap;
pub mod market_data;
pub mod polygon;
pub mod tickers;

pub use discord::{DiscordWebhook, Notifier};
pub use heatmap::{ChromeHeatmapCapture, ImageCapture};
pub use market_data::{fetch_latest_readings, IndicatorProvider};
pub use polygon::PolygonRsiClient;
pub use tickers::{filter_tickers, NasdaqTickerSource, StaticTickerSource, TickerSource};
