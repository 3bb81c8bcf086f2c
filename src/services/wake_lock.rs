//! Keeping the machine awake during a boil

use std::{process::Stdio, sync::Mutex};
use tokio::{
    process::{Child, Command},
    runtime::Handle,
};
use tracing::{debug, info};

use super::{CollaboratorError, WakeLock};

/// Holds a `systemd-inhibit` child process for as long as the lock is held
#[derive(Debug)]
pub struct InhibitorLock {
    program: String,
    child: Mutex<Option<Child>>,
}

impl InhibitorLock {
    pub fn new() -> Self {
        Self::with_program("systemd-inhibit")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: Mutex::new(None),
        }
    }

    fn lock_child(&self) -> Result<std::sync::MutexGuard<'_, Option<Child>>, CollaboratorError> {
        self.child
            .lock()
            .map_err(|e| CollaboratorError::Failed(format!("Failed to lock wake lock state: {}", e)))
    }
}

impl Default for InhibitorLock {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeLock for InhibitorLock {
    fn acquire(&self) -> Result<(), CollaboratorError> {
        let mut child = self.lock_child()?;
        if let Some(existing) = child.as_mut() {
            // Still running means we still hold the inhibitor.
            if matches!(existing.try_wait(), Ok(None)) {
                debug!("Wake lock already held");
                return Ok(());
            }
        }

        Handle::try_current().map_err(|_| CollaboratorError::NoRuntime("wake lock"))?;
        let spawned = Command::new(&self.program)
            .args([
                "--what=idle:sleep",
                "--who=boil-alarm",
                "--why=Boil in progress",
                "--mode=block",
                "sleep",
                "infinity",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CollaboratorError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        *child = Some(spawned);
        info!("Wake lock acquired");
        Ok(())
    }

    fn release(&self) -> Result<(), CollaboratorError> {
        let Some(mut held) = self.lock_child()?.take() else {
            return Ok(());
        };
        held.start_kill()
            .map_err(|e| CollaboratorError::Failed(format!("Failed to release wake lock: {}", e)))?;
        info!("Wake lock released");
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.child
            .lock()
            .ok()
            .and_then(|mut child| child.as_mut().map(|c| matches!(c.try_wait(), Ok(None))))
            .unwrap_or(false)
    }
}

/// Used when the host cannot inhibit sleep; every request succeeds silently
#[derive(Debug, Default)]
pub struct NoWakeLock;

impl WakeLock for NoWakeLock {
    fn acquire(&self) -> Result<(), CollaboratorError> {
        debug!("Wake lock unsupported, ignoring acquire");
        Ok(())
    }

    fn release(&self) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn is_held(&self) -> bool {
        false
    }
}
