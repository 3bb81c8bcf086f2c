//! Elapsed time tracking across pause and resume

use std::time::{Duration, Instant};

/// Wall-clock run state for one start-to-reset cycle
///
/// Elapsed time is derived on demand from the start instant and the total
/// time spent paused; nothing accumulates between calls.
#[derive(Debug, Clone, Default)]
pub struct ElapsedTimeTracker {
    running: bool,
    started_at: Option<Instant>,
    paused_total: Duration,
    paused_at: Option<Instant>,
}

impl ElapsedTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh run at `now`, discarding any previous one
    pub fn start(&mut self, now: Instant) {
        self.running = true;
        self.started_at = Some(now);
        self.paused_total = Duration::ZERO;
        self.paused_at = None;
    }

    /// Freeze elapsed time. Returns false if the timer was not running.
    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.paused_at = Some(now);
        true
    }

    /// Continue a paused run. Returns false unless the timer was paused.
    pub fn resume(&mut self, now: Instant) -> bool {
        if !self.is_paused() {
            return false;
        }
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
        self.running = true;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Elapsed run time at `now`, saturating at `total`
    pub fn elapsed(&self, now: Instant, total: Duration) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        if total.is_zero() {
            return Duration::ZERO;
        }
        // While paused the clock stops at the pause instant.
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(started_at)
            .saturating_sub(self.paused_total)
            .min(total)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        !self.running && self.started_at.is_some()
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }
}
