//! Core application primitives: the alert cycle and what drives it

pub mod runtime;
pub mod scheduler;

pub use runtime::*;
pub use scheduler::*;
