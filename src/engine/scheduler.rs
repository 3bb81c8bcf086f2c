//! Threshold crossing detection
//!
//! Each stage moves through `Idle -> PreFired -> MainFired` at most once per
//! run. Crossings are detected against absolute elapsed time rather than tick
//! counts, so a coarse or late tick still fires every due alert exactly once.

use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};

use super::{
    catalog::{ScheduledStage, StageCatalog},
    settings::StageId,
};

/// Which half of a stage's alert pair fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Advance notice, `pre_alert_seconds` ahead of the threshold
    Pre,
    /// The stage is due now
    Main,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Pre => "pre",
            AlertKind::Main => "main",
        }
    }
}

/// Run-scoped progress of a single stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageProgress {
    #[default]
    Idle,
    PreFired,
    MainFired,
}

/// A crossing detected during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub stage: ScheduledStage,
}

impl AlertEvent {
    pub fn pre(stage: ScheduledStage) -> Self {
        Self { kind: AlertKind::Pre, stage }
    }

    pub fn main(stage: ScheduledStage) -> Self {
        Self { kind: AlertKind::Main, stage }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertScheduler {
    progress: HashMap<StageId, StageProgress>,
}

impl AlertScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `elapsed` against every stage and return newly due alerts in
    /// catalog order
    pub fn evaluate(&mut self, catalog: &StageCatalog, elapsed: Duration, lead: Duration) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        for stage in catalog.iter() {
            let threshold = stage.threshold();
            let progress = self.progress.entry(stage.id.clone()).or_default();

            if !lead.is_zero()
                && *progress == StageProgress::Idle
                && elapsed >= threshold.saturating_sub(lead)
                && elapsed < threshold
            {
                *progress = StageProgress::PreFired;
                events.push(AlertEvent::pre(stage.clone()));
            }

            // The main alert never waits on the pre-alert having fired.
            if elapsed >= threshold && *progress != StageProgress::MainFired {
                *progress = StageProgress::MainFired;
                events.push(AlertEvent::main(stage.clone()));
            }
        }

        events
    }

    pub fn progress(&self, id: &StageId) -> StageProgress {
        self.progress.get(id).copied().unwrap_or_default()
    }

    /// Drop state for stages that are no longer configured
    pub fn retain_stages(&mut self, catalog: &StageCatalog) {
        self.progress.retain(|id, _| catalog.contains(id));
    }

    /// Forget all fired state, ready for a new run
    pub fn clear(&mut self) {
        self.progress.clear();
    }
}
