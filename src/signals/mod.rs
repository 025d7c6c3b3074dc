//! Signal evaluation: turning readings into alert-worthy perspectives.

pub mod classifier;

pub use classifier::{Classifier, Thresholds};
