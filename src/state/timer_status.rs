//! Timer status snapshot published to observers

use std::time::Instant;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{ActiveAlert, AlertEvent, AlertKind, BoilTimer, ScheduledStage};

/// The active alert as seen from outside the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    pub kind: AlertKind,
    pub stage: ScheduledStage,
    pub fired_at: DateTime<Utc>,
}

impl AlertView {
    pub fn from_alert(alert: &ActiveAlert, now: Instant) -> Self {
        let age = now.saturating_duration_since(alert.fired_at);
        let age = chrono::Duration::from_std(age).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            kind: alert.kind,
            stage: alert.stage.clone(),
            fired_at: Utc::now() - age,
        }
    }
}

/// An alert event broadcast to stream subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotice {
    pub kind: AlertKind,
    pub stage: ScheduledStage,
    pub elapsed_seconds: u64,
    pub at: DateTime<Utc>,
}

impl AlertNotice {
    pub fn new(event: &AlertEvent, elapsed_seconds: u64) -> Self {
        Self {
            kind: event.kind,
            stage: event.stage.clone(),
            elapsed_seconds,
            at: Utc::now(),
        }
    }
}

/// Point-in-time view of the boil timer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub running: bool,
    pub paused: bool,
    pub finished: bool,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub next_stage: Option<ScheduledStage>,
    pub active_alert: Option<AlertView>,
    /// A main alert is still sounding
    pub repeating: bool,
}

impl TimerStatus {
    pub fn capture(timer: &BoilTimer, now: Instant) -> Self {
        let elapsed = timer.elapsed(now);
        let total = timer.settings().total_duration();
        Self {
            running: timer.is_running(),
            paused: timer.is_paused(),
            finished: (timer.is_running() || timer.is_paused()) && elapsed >= total,
            elapsed_seconds: elapsed.as_secs(),
            remaining_seconds: total.as_secs().saturating_sub(elapsed.as_secs()),
            total_seconds: total.as_secs(),
            next_stage: timer.catalog().next_stage(elapsed).cloned(),
            active_alert: timer.active_alert().map(|alert| AlertView::from_alert(alert, now)),
            repeating: timer.is_repeating(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::{Settings, SoundKind, Stage},
        services::testing::recording,
    };
    use std::time::Duration;

    #[test]
    fn capture_reflects_running_timer() {
        let (collaborators, _, _) = recording();
        let settings = Settings {
            total_minutes: 60,
            stages: vec![Stage::new("hop", "Hops", 10.0, SoundKind::Bell)],
            pre_alert_seconds: 0,
            ..Settings::default()
        };
        let mut timer = BoilTimer::new(settings, collaborators);
        let t0 = Instant::now();

        let idle = TimerStatus::capture(&timer, t0);
        assert!(!idle.running);
        assert_eq!(idle.remaining_seconds, 3600);
        assert_eq!(idle.next_stage.unwrap().minute, 10);

        timer.start(t0);
        let now = t0 + Duration::from_secs(600);
        timer.tick(now);
        let status = TimerStatus::capture(&timer, now);

        assert!(status.running);
        assert_eq!(status.elapsed_seconds, 600);
        assert_eq!(status.remaining_seconds, 3000);
        assert!(status.next_stage.is_none());
        assert_eq!(status.active_alert.unwrap().kind, AlertKind::Main);
        assert!(status.repeating);
    }

    #[test]
    fn serializes_camel_case() {
        let (collaborators, _, _) = recording();
        let timer = BoilTimer::new(Settings::default(), collaborators);
        let json = serde_json::to_value(TimerStatus::capture(&timer, Instant::now())).unwrap();
        assert_eq!(json["elapsedSeconds"], 0);
        assert_eq!(json["totalSeconds"], 3600);
        assert_eq!(json["activeAlert"], serde_json::Value::Null);
    }
}
