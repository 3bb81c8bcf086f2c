//! API response structures

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::TimerStatus;

/// API response structure for timer control endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerStatus,
}

impl ApiResponse {
    pub fn new(status: &str, message: impl Into<String>, timer: TimerStatus) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer,
        }
    }

    /// The request changed the timer
    pub fn applied(message: impl Into<String>, timer: TimerStatus) -> Self {
        Self::new("ok", message, timer)
    }

    /// The request was valid but had nothing to do in the current state
    pub fn unchanged(message: impl Into<String>, timer: TimerStatus) -> Self {
        Self::new("unchanged", message, timer)
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timer: TimerStatus,
    pub wake_lock: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Wake lock state after a request
#[derive(Debug, Clone, Serialize)]
pub struct WakeLockResponse {
    pub held: bool,
    pub timestamp: DateTime<Utc>,
}

impl WakeLockResponse {
    pub fn new(held: bool) -> Self {
        Self {
            held,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
