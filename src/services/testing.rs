//! Recording collaborators for tests

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use super::{
    AudioOutput, CollaboratorError, Collaborators, Display, Haptics, Notifier, RepeatingSignal, SignalRepeater,
    WakeLock,
};
use crate::engine::SoundKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Play { sound: SoundKind, duration_ms: u64, volume: f32 },
    Vibrate(Vec<u64>),
    Notify { title: String, body: String },
    Flash,
}

/// Records every request made to it
#[derive(Clone, Default)]
pub struct Recorder {
    effects: Arc<Mutex<Vec<Effect>>>,
    fail_audio: Arc<AtomicBool>,
}

impl Recorder {
    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().unwrap().clone()
    }

    pub fn plays(&self) -> Vec<SoundKind> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Play { sound, .. } => Some(sound),
                _ => None,
            })
            .collect()
    }

    /// Titles of sent notifications
    pub fn notifications(&self) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Notify { title, .. } => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn fail_audio(&self, fail: bool) {
        self.fail_audio.store(fail, Ordering::SeqCst);
    }

    fn record(&self, effect: Effect) {
        self.effects.lock().unwrap().push(effect);
    }
}

impl AudioOutput for Recorder {
    fn play(&self, sound: SoundKind, duration_ms: u64, volume: f32) -> Result<(), CollaboratorError> {
        if self.fail_audio.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Failed("audio device unavailable".to_string()));
        }
        self.record(Effect::Play { sound, duration_ms, volume });
        Ok(())
    }
}

impl Haptics for Recorder {
    fn vibrate(&self, pattern: &[u64]) -> Result<(), CollaboratorError> {
        self.record(Effect::Vibrate(pattern.to_vec()));
        Ok(())
    }
}

impl Notifier for Recorder {
    fn notify(&self, title: &str, body: &str) -> Result<(), CollaboratorError> {
        self.record(Effect::Notify {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

impl Display for Recorder {
    fn flash(&self) -> Result<(), CollaboratorError> {
        self.record(Effect::Flash);
        Ok(())
    }
}

struct Scheduled {
    interval: Duration,
    active: Arc<AtomicBool>,
    action: Box<dyn Fn() + Send + Sync>,
}

/// Repeater driven by hand instead of by a clock
#[derive(Clone, Default)]
pub struct ManualRepeater {
    scheduled: Arc<Mutex<Vec<Scheduled>>>,
}

impl ManualRepeater {
    /// Run one repetition of every active signal
    pub fn fire(&self) {
        for scheduled in self.scheduled.lock().unwrap().iter() {
            if scheduled.active.load(Ordering::SeqCst) {
                (scheduled.action)();
            }
        }
    }

    pub fn started(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }

    pub fn active(&self) -> usize {
        self.scheduled
            .lock()
            .unwrap()
            .iter()
            .filter(|scheduled| scheduled.active.load(Ordering::SeqCst))
            .count()
    }

    pub fn last_interval_ms(&self) -> Option<u128> {
        self.scheduled
            .lock()
            .unwrap()
            .last()
            .map(|scheduled| scheduled.interval.as_millis())
    }
}

struct ManualSignal {
    active: Arc<AtomicBool>,
}

impl RepeatingSignal for ManualSignal {
    fn stop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl SignalRepeater for ManualRepeater {
    fn repeat(
        &self,
        interval: Duration,
        action: Box<dyn Fn() + Send + Sync>,
    ) -> Result<Box<dyn RepeatingSignal>, CollaboratorError> {
        let active = Arc::new(AtomicBool::new(true));
        self.scheduled.lock().unwrap().push(Scheduled {
            interval,
            active: Arc::clone(&active),
            action,
        });
        Ok(Box::new(ManualSignal { active }))
    }
}

/// Wake lock that only tracks whether it is held
#[derive(Default)]
pub struct FlagWakeLock {
    held: AtomicBool,
}

impl WakeLock for FlagWakeLock {
    fn acquire(&self) -> Result<(), CollaboratorError> {
        self.held.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) -> Result<(), CollaboratorError> {
        self.held.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Collaborators backed by a shared recorder and a manual repeater
pub fn recording() -> (Collaborators, Recorder, ManualRepeater) {
    let recorder = Recorder::default();
    let repeater = ManualRepeater::default();
    let collaborators = Collaborators {
        audio: Arc::new(recorder.clone()),
        haptics: Arc::new(recorder.clone()),
        notifier: Arc::new(recorder.clone()),
        display: Arc::new(recorder.clone()),
        repeater: Arc::new(repeater.clone()),
    };
    (collaborators, recorder, repeater)
}
