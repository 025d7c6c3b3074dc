//! Shared data models spanning the alert cycle.

pub mod indicators;
pub mod perspective;

pub use indicators::{IndicatorReading, RSI_WINDOW};
pub use perspective::{Perspective, RsiStatus};
