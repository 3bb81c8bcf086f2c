//! Boil Alarm - A boil timer daemon with staged alerts
//!
//! This library tracks elapsed time through a boil, fires a heads-up
//! pre-alert and a sustained main alert for every configured stage, and
//! exposes the timer over a small HTTP API.

pub mod api;
pub mod config;
pub mod engine;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use engine::{BoilTimer, Settings};
pub use state::AppState;
pub use utils::signals::shutdown_signal;
