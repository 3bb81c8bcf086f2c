//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{AlertNotice, SettingsStore, StoreError, TimerStatus};
use crate::{
    engine::{BoilTimer, Settings, Stage, StageDraft, StageId, StagePatch, TickReport},
    services::{CollaboratorError, WakeLock},
};

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to lock {0}")]
    Lock(&'static str),

    #[error("Stage '{0}' not found")]
    StageNotFound(StageId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Wake lock error: {0}")]
    WakeLock(#[from] CollaboratorError),
}

/// Shared state behind the HTTP API and the tick task
pub struct AppState {
    /// The boil timer and its alert engine
    pub timer: Arc<Mutex<BoilTimer>>,
    pub store: SettingsStore,
    pub wake_lock: Arc<dyn WakeLock>,
    /// Hold the wake lock automatically while the boil is running
    pub keep_awake: bool,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Alert events for stream subscribers
    pub alert_tx: broadcast::Sender<AlertNotice>,
    /// Latest timer status
    pub status_tx: watch::Sender<TimerStatus>,
    /// Keep the receiver alive to prevent channel closure
    pub _status_rx: watch::Receiver<TimerStatus>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        timer: BoilTimer,
        store: SettingsStore,
        wake_lock: Arc<dyn WakeLock>,
        keep_awake: bool,
    ) -> Self {
        let (alert_tx, _) = broadcast::channel(100);
        let (status_tx, status_rx) = watch::channel(TimerStatus::capture(&timer, Instant::now()));

        Self {
            timer: Arc::new(Mutex::new(timer)),
            store,
            wake_lock,
            keep_awake,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            alert_tx,
            status_tx,
            _status_rx: status_rx,
        }
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, BoilTimer>, StateError> {
        self.timer.lock().map_err(|_| StateError::Lock("boil timer"))
    }

    /// Apply a control action to the timer and publish the resulting status
    fn control<T, F>(&self, action: &str, apply: F) -> Result<(T, TimerStatus), StateError>
    where
        F: FnOnce(&mut BoilTimer, Instant) -> T,
    {
        let mut timer = self.lock_timer()?;
        let now = Instant::now();
        let result = apply(&mut *timer, now);
        let status = TimerStatus::capture(&timer, now);
        drop(timer); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        self.publish(status.clone());
        Ok((result, status))
    }

    fn publish(&self, status: TimerStatus) {
        if let Err(e) = self.status_tx.send(status) {
            warn!("Failed to send status update: {}", e);
        }
    }

    pub fn start(&self) -> Result<TimerStatus, StateError> {
        let ((), status) = self.control("start", |timer, now| timer.start(now))?;
        self.hold_awake(true);
        Ok(status)
    }

    pub fn pause(&self) -> Result<(bool, TimerStatus), StateError> {
        let (paused, status) = self.control("pause", |timer, now| timer.pause(now))?;
        if paused {
            self.hold_awake(false);
        }
        Ok((paused, status))
    }

    pub fn resume(&self) -> Result<(bool, TimerStatus), StateError> {
        let (resumed, status) = self.control("resume", |timer, now| timer.resume(now))?;
        if resumed {
            self.hold_awake(true);
        }
        Ok((resumed, status))
    }

    pub fn reset(&self) -> Result<TimerStatus, StateError> {
        let ((), status) = self.control("reset", |timer, _| timer.reset())?;
        self.hold_awake(false);
        Ok(status)
    }

    pub fn acknowledge(&self) -> Result<(bool, TimerStatus), StateError> {
        self.control("acknowledge", |timer, _| timer.acknowledge())
    }

    /// Advance the timer to the current instant; called by the tick task
    pub fn tick(&self) -> Result<TickReport, StateError> {
        let mut timer = self.lock_timer()?;
        let now = Instant::now();
        let report = timer.tick(now);
        let status = TimerStatus::capture(&timer, now);
        drop(timer);

        for event in &report.events {
            // No subscribers is not an error
            if self.alert_tx.send(AlertNotice::new(event, report.elapsed_seconds)).is_err() {
                debug!("No alert stream subscribers");
            }
        }
        self.publish(status);
        Ok(report)
    }

    /// Called once when a run reaches its full duration
    pub fn finish(&self) {
        info!("Boil complete");
        self.hold_awake(false);
    }

    pub fn status(&self) -> Result<TimerStatus, StateError> {
        let timer = self.lock_timer()?;
        Ok(TimerStatus::capture(&timer, Instant::now()))
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TimerStatus> {
        self.status_tx.subscribe()
    }

    pub fn subscribe_alerts(&self) -> broadcast::Receiver<AlertNotice> {
        self.alert_tx.subscribe()
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> Result<Settings, StateError> {
        Ok(self.lock_timer()?.settings().clone())
    }

    /// Replace the settings and persist them
    pub fn configure(&self, settings: Settings) -> Result<Settings, StateError> {
        let ((), _) = self.control("configure", |timer, _| timer.configure(settings))?;
        self.persist()
    }

    pub fn add_stage(&self, draft: StageDraft) -> Result<Stage, StateError> {
        let (stage, _) = self.control("add-stage", |timer, _| timer.add_stage(draft))?;
        self.persist()?;
        info!("Added stage '{}' at minute {}", stage.label, stage.threshold_minutes);
        Ok(stage)
    }

    pub fn update_stage(&self, id: &StageId, patch: StagePatch) -> Result<Stage, StateError> {
        let (stage, _) = self.control("update-stage", |timer, _| timer.update_stage(id, patch))?;
        let stage = stage.ok_or_else(|| StateError::StageNotFound(id.clone()))?;
        self.persist()?;
        info!("Updated stage '{}'", stage.id);
        Ok(stage)
    }

    pub fn remove_stage(&self, id: &StageId) -> Result<Stage, StateError> {
        let (stage, _) = self.control("remove-stage", |timer, _| timer.remove_stage(id))?;
        let stage = stage.ok_or_else(|| StateError::StageNotFound(id.clone()))?;
        self.persist()?;
        info!("Removed stage '{}'", stage.id);
        Ok(stage)
    }

    fn persist(&self) -> Result<Settings, StateError> {
        let settings = self.settings()?;
        self.store.save(&settings)?;
        Ok(settings)
    }

    // ── Wake lock ────────────────────────────────────────────────────

    pub fn acquire_wake_lock(&self) -> Result<bool, StateError> {
        self.wake_lock.acquire()?;
        Ok(self.wake_lock.is_held())
    }

    pub fn release_wake_lock(&self) -> Result<bool, StateError> {
        self.wake_lock.release()?;
        Ok(self.wake_lock.is_held())
    }

    pub fn wake_lock_held(&self) -> bool {
        self.wake_lock.is_held()
    }

    fn hold_awake(&self, hold: bool) {
        if !self.keep_awake {
            return;
        }
        let result = if hold {
            self.wake_lock.acquire()
        } else {
            self.wake_lock.release()
        };
        if let Err(e) = result {
            warn!("Failed to {} wake lock: {}", if hold { "acquire" } else { "release" }, e);
        }
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_duration(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Silence alerts and let go of the wake lock before exiting
    pub fn shutdown(&self) {
        match self.lock_timer() {
            Ok(mut timer) => {
                timer.acknowledge();
            }
            Err(e) => warn!("Failed to silence alerts on shutdown: {}", e),
        }
        if let Err(e) = self.wake_lock.release() {
            warn!("Failed to release wake lock on shutdown: {}", e);
        }
    }
}

fn format_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
