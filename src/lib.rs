//! rsiwatch: daily RSI scanner that posts overbought/oversold alerts to a Discord webhook.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;
pub mod notification;
pub mod services;
pub mod signals;
