//! Environment-sourced configuration, read once at startup.

use crate::error::ConfigError;
use crate::notification::EmbedStyle;
use chrono::NaiveTime;
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_RSI_ENDPOINT: &str = "https://api.polygon.io/v1/indicators/rsi";
pub const DEFAULT_TICKER_LIST_URL: &str =
    "https://www.nasdaqtrader.com/dynamic/SymDir/nasdaqlisted.txt";
pub const DEFAULT_HEATMAP_URL: &str = "https://www.tradingview.com/heatmap/stock/#%7B%22dataSource%22%3A%22NASDAQ100%22%2C%22blockColor%22%3A%22change%22%2C%22blockSize%22%3A%22market_cap_basic%22%2C%22grouping%22%3A%22sector%22%7D";

/// Returns the deployment environment name (`APP_ENV`), defaulting to "sandbox".
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub polygon_api_key: String,
    pub discord_webhook_url: String,
    pub rsi_endpoint: String,
    pub rsi_overbought: i64,
    pub rsi_oversold: i64,
    pub show_overbought: bool,
    pub show_oversold: bool,
    pub use_timer: bool,
    pub loop_forever: bool,
    pub schedule_time: NaiveTime,
    pub cooldown: Duration,
    pub ticker_limit: usize,
    pub request_timeout: Duration,
    /// Fixed universe; when set the Nasdaq listing is not fetched.
    pub tickers: Option<Vec<String>>,
    pub ticker_list_url: String,
    pub embed_style: EmbedStyle,
    pub heatmap: HeatmapConfig,
}

#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    pub enabled: bool,
    pub url: String,
    pub chrome_bin: String,
    pub output_dir: String,
}

impl Config {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let polygon_api_key =
            get("POLYGON_API_KEY").ok_or(ConfigError::Missing("POLYGON_API_KEY"))?;
        let discord_webhook_url =
            get("DISCORD_WEBHOOK_URL").ok_or(ConfigError::Missing("DISCORD_WEBHOOK_URL"))?;
        validate_url("DISCORD_WEBHOOK_URL", &discord_webhook_url)?;

        let rsi_endpoint = get("RSI_ENDPOINT").unwrap_or_else(|| DEFAULT_RSI_ENDPOINT.to_string());
        validate_url("RSI_ENDPOINT", &rsi_endpoint)?;

        let rsi_overbought = parse_or("RSI_OVERBOUGHT", get("RSI_OVERBOUGHT"), 70i64)?;
        let rsi_oversold = parse_or("RSI_OVERSOLD", get("RSI_OVERSOLD"), 30i64)?;
        if rsi_oversold >= rsi_overbought {
            return Err(ConfigError::Invalid {
                key: "RSI_OVERSOLD",
                value: rsi_oversold.to_string(),
                reason: format!("must be below RSI_OVERBOUGHT ({})", rsi_overbought),
            });
        }

        let raw_time = get("SCHEDULE_TIME").unwrap_or_else(|| "09:46".to_string());
        let schedule_time =
            NaiveTime::parse_from_str(&raw_time, "%H:%M").map_err(|e| ConfigError::Invalid {
                key: "SCHEDULE_TIME",
                reason: e.to_string(),
                value: raw_time.clone(),
            })?;

        let ticker_limit = parse_or("TICKER_LIMIT", get("TICKER_LIMIT"), 1000usize)?;
        if ticker_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "TICKER_LIMIT",
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let tickers = get("TICKERS").map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
        });

        let embed_style = match get("EMBED_STYLE") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                key: "EMBED_STYLE",
                value: raw.clone(),
                reason,
            })?,
            None => EmbedStyle::default(),
        };

        Ok(Self {
            polygon_api_key,
            discord_webhook_url,
            rsi_endpoint,
            rsi_overbought,
            rsi_oversold,
            show_overbought: parse_flag("SHOW_OVERBOUGHT", get("SHOW_OVERBOUGHT"), true)?,
            show_oversold: parse_flag("SHOW_OVERSOLD", get("SHOW_OVERSOLD"), true)?,
            use_timer: parse_flag("USE_TIMER", get("USE_TIMER"), true)?,
            loop_forever: parse_flag("LOOP", get("LOOP"), true)?,
            schedule_time,
            cooldown: Duration::from_secs(parse_or(
                "COOLDOWN_SECONDS",
                get("COOLDOWN_SECONDS"),
                60u64,
            )?),
            ticker_limit,
            request_timeout: Duration::from_secs(parse_or(
                "REQUEST_TIMEOUT_SECONDS",
                get("REQUEST_TIMEOUT_SECONDS"),
                30u64,
            )?),
            tickers,
            ticker_list_url: get("TICKER_LIST_URL")
                .unwrap_or_else(|| DEFAULT_TICKER_LIST_URL.to_string()),
            embed_style,
            heatmap: HeatmapConfig {
                enabled: parse_flag("HEATMAP_ENABLED", get("HEATMAP_ENABLED"), false)?,
                url: get("HEATMAP_URL").unwrap_or_else(|| DEFAULT_HEATMAP_URL.to_string()),
                chrome_bin: get("CHROME_BIN").unwrap_or_else(|| "chromium".to_string()),
                output_dir: get("SCREENSHOT_DIR")
                    .unwrap_or_else(|| "downloaded_images".to_string()),
            },
        })
    }
}

fn validate_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}
