//! Desktop implementations of the alert collaborators
//!
//! External programs are spawned on the tokio runtime and never awaited by
//! the caller; their failures are logged from the background task.

use std::{
    io::Write,
    path::PathBuf,
    process::Stdio,
    time::Duration,
};
use tokio::{process::Command, runtime::Handle, time::{sleep, timeout}};
use tracing::{debug, warn};

use super::{AudioOutput, CollaboratorError, Display, Haptics, Notifier};
use crate::engine::SoundKind;

/// paplay expresses volume on a 0..=65536 scale
const PAPLAY_FULL_VOLUME: f32 = 65536.0;
const FLASH_DURATION: Duration = Duration::from_millis(150);

fn runtime(what: &'static str) -> Result<Handle, CollaboratorError> {
    Handle::try_current().map_err(|_| CollaboratorError::NoRuntime(what))
}

/// Plays `<sounds_dir>/<kind>.oga` through an external player
#[derive(Debug, Clone)]
pub struct CommandAudio {
    pub program: String,
    pub sounds_dir: PathBuf,
}

impl CommandAudio {
    pub fn new(program: impl Into<String>, sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            sounds_dir: sounds_dir.into(),
        }
    }

    pub fn sound_file(&self, sound: SoundKind) -> PathBuf {
        self.sounds_dir.join(format!("{}.oga", sound))
    }
}

impl AudioOutput for CommandAudio {
    fn play(&self, sound: SoundKind, duration_ms: u64, volume: f32) -> Result<(), CollaboratorError> {
        let handle = runtime("audio player")?;
        if volume <= 0.0 {
            debug!("Volume is zero, not playing {}", sound);
            return Ok(());
        }

        let file = self.sound_file(sound);
        let mut child = Command::new(&self.program)
            .arg(format!("--volume={}", (volume.clamp(0.0, 1.0) * PAPLAY_FULL_VOLUME) as u32))
            .arg(&file)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CollaboratorError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        debug!("Playing {} for up to {}ms", file.display(), duration_ms);
        handle.spawn(async move {
            let waited = timeout(Duration::from_millis(duration_ms), child.wait()).await;
            match waited {
                Ok(Ok(status)) if !status.success() => {
                    warn!("Sound player exited with {} for {}", status, file.display());
                }
                Ok(Err(e)) => warn!("Failed to wait for sound player: {}", e),
                Ok(Ok(_)) => {}
                Err(_) => {
                    // Sound is longer than the requested duration; cut it off.
                    if let Err(e) = child.kill().await {
                        warn!("Failed to stop sound player: {}", e);
                    }
                }
            }
        });
        Ok(())
    }
}

/// Rings the terminal bell when no sound files are configured
#[derive(Debug, Clone, Default)]
pub struct TerminalBell;

impl AudioOutput for TerminalBell {
    fn play(&self, sound: SoundKind, _duration_ms: u64, volume: f32) -> Result<(), CollaboratorError> {
        if volume <= 0.0 {
            return Ok(());
        }
        debug!("Ringing terminal bell for {}", sound);
        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| CollaboratorError::Failed(format!("terminal bell: {}", e)))
    }
}

/// Desktop notifications through `notify-send`
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    pub program: String,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self {
            program: "notify-send".to_string(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), CollaboratorError> {
        let handle = runtime("notifier")?;
        let program = self.program.clone();
        let title = title.to_string();
        let body = body.to_string();

        handle.spawn(async move {
            let output = Command::new(&program)
                .args(["--app-name=boil-alarm", "--urgency=critical"])
                .arg(&title)
                .arg(&body)
                .output()
                .await;

            match output {
                Ok(output) if !output.status.success() => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!("{} failed: {}", program, stderr.trim());
                }
                Ok(_) => debug!("Notification sent: {}", title),
                Err(e) => warn!("Failed to execute {}: {}", program, e),
            }
        });
        Ok(())
    }
}

/// Flashes the terminal with a reverse-video visual bell
#[derive(Debug, Clone, Default)]
pub struct TerminalFlash;

impl Display for TerminalFlash {
    fn flash(&self) -> Result<(), CollaboratorError> {
        let handle = runtime("screen flash")?;
        write_stderr(b"\x1b[?5h")?;
        handle.spawn(async {
            sleep(FLASH_DURATION).await;
            if let Err(e) = write_stderr(b"\x1b[?5l") {
                warn!("Failed to restore terminal after flash: {}", e);
            }
        });
        Ok(())
    }
}

fn write_stderr(bytes: &[u8]) -> Result<(), CollaboratorError> {
    let mut stderr = std::io::stderr();
    stderr
        .write_all(bytes)
        .and_then(|_| stderr.flush())
        .map_err(|e| CollaboratorError::Failed(format!("terminal write: {}", e)))
}

/// Desktops have no vibration motor; requests are accepted and dropped
#[derive(Debug, Clone, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), CollaboratorError> {
        debug!("Vibration unsupported, ignoring pattern {:?}", pattern);
        Ok(())
    }
}
