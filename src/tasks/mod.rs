//! Background tasks module
//!
//! This module contains the tick driver and the repeating alert signal.

pub mod repeater;
pub mod tick;

// Re-export main types
pub use repeater::TokioRepeater;
pub use tick::tick_task;
