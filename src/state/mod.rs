//! State management module
//!
//! Shared application state, the published timer status and settings persistence.

pub mod app_state;
pub mod settings_store;
pub mod timer_status;

// Re-export main types
pub use app_state::{AppState, StateError};
pub use settings_store::{SettingsStore, StoreError};
pub use timer_status::{AlertNotice, AlertView, TimerStatus};
