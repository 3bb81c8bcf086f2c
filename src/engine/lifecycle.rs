//! Active alert slot and the repeat-until-acknowledged signal

use std::time::Instant;

use tracing::{debug, info, warn};

use super::{
    catalog::ScheduledStage,
    scheduler::{AlertEvent, AlertKind},
    settings::{Settings, SoundKind},
};
use crate::services::{CollaboratorError, Collaborators, NotificationPermission, RepeatingSignal};

const PRE_ALERT_VIBRATION: [u64; 1] = [200];
const MAIN_ALERT_VIBRATION: [u64; 5] = [400, 150, 400, 150, 800];

/// The alert currently shown to the user
///
/// Later alerts replace earlier ones; nothing is queued.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveAlert {
    pub kind: AlertKind,
    pub stage: ScheduledStage,
    pub fired_at: Instant,
}

/// Owns the single active alert and the sustained main-alert sound
pub struct AlertLifecycle {
    collaborators: Collaborators,
    permission: NotificationPermission,
    active: Option<ActiveAlert>,
    repeating: Option<Box<dyn RepeatingSignal>>,
}

impl AlertLifecycle {
    pub fn new(collaborators: Collaborators) -> Self {
        Self {
            collaborators,
            permission: NotificationPermission::default(),
            active: None,
            repeating: None,
        }
    }

    pub fn set_permission(&mut self, permission: NotificationPermission) {
        self.permission = permission;
    }

    pub fn active(&self) -> Option<&ActiveAlert> {
        self.active.as_ref()
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating.as_ref().is_some_and(|signal| signal.is_active())
    }

    /// React to a fired alert
    pub fn handle(&mut self, event: &AlertEvent, settings: &Settings, now: Instant) {
        match event.kind {
            AlertKind::Pre => self.fire_pre_alert(&event.stage, settings),
            AlertKind::Main => self.fire_main_alert(&event.stage, settings),
        }
        self.active = Some(ActiveAlert {
            kind: event.kind,
            stage: event.stage.clone(),
            fired_at: now,
        });
    }

    /// Silence and dismiss whatever alert is active.
    /// Returns false if there was nothing to acknowledge.
    pub fn acknowledge(&mut self) -> bool {
        let had_alert = self.active.is_some() || self.repeating.is_some();
        if let Some(alert) = &self.active {
            info!("Acknowledged {} alert for stage '{}'", alert.kind.as_str(), alert.stage.label);
        }
        self.clear();
        had_alert
    }

    /// Drop the active alert and stop any repeat, as on start or reset
    pub fn clear(&mut self) {
        self.stop_repeat();
        self.active = None;
    }

    fn fire_pre_alert(&mut self, stage: &ScheduledStage, settings: &Settings) {
        info!("Pre-alert for stage '{}' at minute {}", stage.label, stage.minute);

        dispatch(
            "audio",
            self.collaborators
                .audio
                .play(SoundKind::Chirp, SoundKind::Chirp.play_duration_ms(), settings.volume),
        );
        if settings.vibration {
            dispatch("haptics", self.collaborators.haptics.vibrate(&PRE_ALERT_VIBRATION));
        }
        if settings.screen_flash {
            dispatch("display", self.collaborators.display.flash());
        }
        self.notify(
            &format!("Up next: {}", stage.label),
            &format!("{} in {} seconds (minute {})", stage.label, settings.pre_alert_seconds, stage.minute),
        );
    }

    fn fire_main_alert(&mut self, stage: &ScheduledStage, settings: &Settings) {
        info!("Main alert for stage '{}' at minute {}", stage.label, stage.minute);

        if settings.screen_flash {
            dispatch("display", self.collaborators.display.flash());
        }
        if settings.vibration {
            dispatch("haptics", self.collaborators.haptics.vibrate(&MAIN_ALERT_VIBRATION));
        }
        self.notify(&stage.label, &format!("Minute {}: time for {}", stage.minute, stage.label));

        // Only one repeat may run; replace rather than overlap.
        self.stop_repeat();

        let audio = self.collaborators.audio.clone();
        let sound = stage.sound;
        let duration_ms = sound.play_duration_ms();
        let volume = settings.volume;

        dispatch("audio", audio.play(sound, duration_ms, volume));

        let action = Box::new(move || dispatch("audio", audio.play(sound, duration_ms, volume)));
        match self.collaborators.repeater.repeat(settings.repeat_interval(), action) {
            Ok(signal) => {
                debug!("Repeating {} every {}ms until acknowledged", sound, settings.repeat_interval_ms);
                self.repeating = Some(signal);
            }
            Err(e) => warn!("Failed to start repeating alert sound: {}", e),
        }
    }

    fn notify(&self, title: &str, body: &str) {
        if self.permission != NotificationPermission::Granted {
            debug!("Skipping notification, permission is {:?}", self.permission);
            return;
        }
        dispatch("notifier", self.collaborators.notifier.notify(title, body));
    }

    fn stop_repeat(&mut self) {
        if let Some(mut signal) = self.repeating.take() {
            signal.stop();
            debug!("Stopped repeating alert sound");
        }
    }
}

impl Drop for AlertLifecycle {
    fn drop(&mut self) {
        self.stop_repeat();
    }
}

/// Log a collaborator failure without letting it escape
fn dispatch(collaborator: &str, result: Result<(), CollaboratorError>) {
    if let Err(e) = result {
        warn!("{} request failed: {}", collaborator, e);
    }
}
