//! Canonical stage ordering

use std::time::Duration;

use serde::Serialize;

use super::settings::{SoundKind, Stage, StageId};

/// A stage with its threshold rounded to a whole minute inside the boil
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledStage {
    pub id: StageId,
    pub label: String,
    pub minute: u32,
    pub sound: SoundKind,
}

impl ScheduledStage {
    /// Offset from the start of the boil at which the stage is due
    pub fn threshold(&self) -> Duration {
        Duration::from_secs(u64::from(self.minute) * 60)
    }
}

/// Stages sorted by threshold, ties kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageCatalog {
    stages: Vec<ScheduledStage>,
}

impl StageCatalog {
    pub fn build(stages: &[Stage], total_minutes: u32) -> Self {
        let mut stages: Vec<ScheduledStage> = stages
            .iter()
            .map(|stage| ScheduledStage {
                id: stage.id.clone(),
                label: stage.label.clone(),
                minute: canonical_minute(stage.threshold_minutes, total_minutes),
                sound: stage.sound,
            })
            .collect();
        // sort_by_key is stable, which keeps tied stages in insertion order
        stages.sort_by_key(|stage| stage.minute);
        Self { stages }
    }

    pub fn stages(&self) -> &[ScheduledStage] {
        &self.stages
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledStage> {
        self.stages.iter()
    }

    pub fn get(&self, id: &StageId) -> Option<&ScheduledStage> {
        self.stages.iter().find(|stage| &stage.id == id)
    }

    pub fn contains(&self, id: &StageId) -> bool {
        self.get(id).is_some()
    }

    /// First stage whose threshold lies strictly after `elapsed`
    pub fn next_stage(&self, elapsed: Duration) -> Option<&ScheduledStage> {
        self.stages.iter().find(|stage| stage.threshold() > elapsed)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

fn canonical_minute(raw: f64, total_minutes: u32) -> u32 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, f64::from(total_minutes)) as u32
}
