//! Stage alert scheduling engine
//!
//! The engine is a wall-clock driven state machine with no threads of its
//! own. A driver calls [`BoilTimer::tick`] periodically; each tick recomputes
//! elapsed time, detects stage crossings and hands them to the alert
//! lifecycle, which talks to device collaborators.
//!
//! ```text
//! tick(now) -> ElapsedTimeTracker -> AlertScheduler -> AlertLifecycle -> collaborators
//! ```

pub mod catalog;
pub mod lifecycle;
pub mod scheduler;
pub mod settings;
pub mod tracker;

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::services::{Collaborators, NotificationPermission};

// Re-export main types
pub use catalog::{ScheduledStage, StageCatalog};
pub use lifecycle::{ActiveAlert, AlertLifecycle};
pub use scheduler::{AlertEvent, AlertKind, AlertScheduler, StageProgress};
pub use settings::{Settings, SoundKind, Stage, StageDraft, StageId, StagePatch};
pub use tracker::ElapsedTimeTracker;

/// Outcome of a single tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    pub next_stage: Option<ScheduledStage>,
    pub events: Vec<AlertEvent>,
    /// Elapsed time has reached the total boil duration
    pub finished: bool,
}

/// A boil timer with staged alerts
pub struct BoilTimer {
    settings: Settings,
    catalog: StageCatalog,
    tracker: ElapsedTimeTracker,
    scheduler: AlertScheduler,
    lifecycle: AlertLifecycle,
}

impl BoilTimer {
    pub fn new(settings: Settings, collaborators: Collaborators) -> Self {
        let settings = settings.sanitized();
        let catalog = StageCatalog::build(&settings.stages, settings.total_minutes);
        Self {
            settings,
            catalog,
            tracker: ElapsedTimeTracker::new(),
            scheduler: AlertScheduler::new(),
            lifecycle: AlertLifecycle::new(collaborators),
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Replace the settings, keeping any run in progress
    pub fn configure(&mut self, settings: Settings) {
        self.settings = settings.sanitized();
        self.rebuild_catalog();
        debug!(
            "Configured {} stages over {} minutes",
            self.catalog.len(),
            self.settings.total_minutes
        );
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    pub fn add_stage(&mut self, draft: StageDraft) -> Stage {
        let stage = draft.into_stage();
        self.settings.stages.push(stage.clone());
        self.rebuild_catalog();
        stage
    }

    pub fn update_stage(&mut self, id: &StageId, patch: StagePatch) -> Option<Stage> {
        let stage = self.settings.stages.iter_mut().find(|stage| &stage.id == id)?;
        stage.apply(patch);
        let updated = stage.clone();
        self.rebuild_catalog();
        Some(updated)
    }

    pub fn remove_stage(&mut self, id: &StageId) -> Option<Stage> {
        let index = self.settings.stages.iter().position(|stage| &stage.id == id)?;
        let removed = self.settings.stages.remove(index);
        self.rebuild_catalog();
        Some(removed)
    }

    pub fn set_notification_permission(&mut self, permission: NotificationPermission) {
        self.lifecycle.set_permission(permission);
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh run, discarding all fired state and any active alert
    pub fn start(&mut self, now: Instant) {
        self.lifecycle.clear();
        self.scheduler.clear();
        self.tracker.start(now);
        info!("Boil started ({} minutes, {} stages)", self.settings.total_minutes, self.catalog.len());
    }

    pub fn pause(&mut self, now: Instant) -> bool {
        let paused = self.tracker.pause(now);
        if paused {
            info!("Boil paused at {}s", self.elapsed(now).as_secs());
        }
        paused
    }

    pub fn resume(&mut self, now: Instant) -> bool {
        let resumed = self.tracker.resume(now);
        if resumed {
            info!("Boil resumed at {}s", self.elapsed(now).as_secs());
        }
        resumed
    }

    pub fn reset(&mut self) {
        self.lifecycle.clear();
        self.scheduler.clear();
        self.tracker.reset();
        info!("Boil reset");
    }

    pub fn acknowledge(&mut self) -> bool {
        self.lifecycle.acknowledge()
    }

    /// Advance the timer to `now` and fire any alerts that became due
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let elapsed = self.elapsed(now);

        let events = if self.tracker.is_running() {
            let events = self
                .scheduler
                .evaluate(&self.catalog, elapsed, self.settings.pre_alert_lead());
            for event in &events {
                self.lifecycle.handle(event, &self.settings, now);
            }
            events
        } else {
            Vec::new()
        };

        let total = self.settings.total_duration();
        TickReport {
            elapsed_seconds: elapsed.as_secs(),
            remaining_seconds: total.as_secs().saturating_sub(elapsed.as_secs()),
            next_stage: self.catalog.next_stage(elapsed).cloned(),
            events,
            finished: self.tracker.has_started() && elapsed >= total,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.tracker.elapsed(now, self.settings.total_duration())
    }

    pub fn active_alert(&self) -> Option<&ActiveAlert> {
        self.lifecycle.active()
    }

    pub fn is_running(&self) -> bool {
        self.tracker.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.tracker.is_paused()
    }

    pub fn is_repeating(&self) -> bool {
        self.lifecycle.is_repeating()
    }

    pub fn stage_progress(&self, id: &StageId) -> StageProgress {
        self.scheduler.progress(id)
    }

    fn rebuild_catalog(&mut self) {
        self.catalog = StageCatalog::build(&self.settings.stages, self.settings.total_minutes);
        self.scheduler.retain_stages(&self.catalog);
    }
}
