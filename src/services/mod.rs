//! Device collaborators
//!
//! The alert engine never touches audio, notification or display APIs
//! directly. It calls out through these narrow traits, which lets the daemon
//! plug in desktop implementations and lets tests plug in recorders.
//! Every call is fire-and-forget: implementations must not block the caller.

pub mod desktop;
pub mod system;
pub mod wake_lock;

#[cfg(test)]
pub mod testing;

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::SoundKind;

// Re-export main types
pub use desktop::{CommandAudio, DesktopNotifier, NoHaptics, TerminalBell, TerminalFlash};
pub use system::check_command_available;
pub use wake_lock::{InhibitorLock, NoWakeLock};

/// Failure to dispatch a request to a collaborator
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("no async runtime available to run {0}")]
    NoRuntime(&'static str),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Failed(String),
}

/// Notification permission as reported by the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Granted,
    Denied,
    #[default]
    Default,
}

pub trait AudioOutput: Send + Sync {
    fn play(&self, sound: SoundKind, duration_ms: u64, volume: f32) -> Result<(), CollaboratorError>;
}

pub trait Haptics: Send + Sync {
    /// Vibrate with alternating on/off durations in milliseconds
    fn vibrate(&self, pattern: &[u64]) -> Result<(), CollaboratorError>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<(), CollaboratorError>;
}

pub trait Display: Send + Sync {
    fn flash(&self) -> Result<(), CollaboratorError>;
}

pub trait WakeLock: Send + Sync {
    fn acquire(&self) -> Result<(), CollaboratorError>;
    fn release(&self) -> Result<(), CollaboratorError>;
    fn is_held(&self) -> bool;
}

/// Handle to a running repeat; stopping is idempotent
pub trait RepeatingSignal: Send {
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// Runs an action every `interval` until the returned handle is stopped
///
/// The first run happens one interval after the call.
pub trait SignalRepeater: Send + Sync {
    fn repeat(
        &self,
        interval: Duration,
        action: Box<dyn Fn() + Send + Sync>,
    ) -> Result<Box<dyn RepeatingSignal>, CollaboratorError>;
}

/// The set of collaborators an alert engine dispatches to
#[derive(Clone)]
pub struct Collaborators {
    pub audio: Arc<dyn AudioOutput>,
    pub haptics: Arc<dyn Haptics>,
    pub notifier: Arc<dyn Notifier>,
    pub display: Arc<dyn Display>,
    pub repeater: Arc<dyn SignalRepeater>,
}
