//! Tokio-backed repeating signal

use std::time::Duration;
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

use crate::services::{CollaboratorError, RepeatingSignal, SignalRepeater};

/// Spawns one interval task per repeating signal
#[derive(Debug, Clone, Default)]
pub struct TokioRepeater;

impl SignalRepeater for TokioRepeater {
    fn repeat(
        &self,
        interval: Duration,
        action: Box<dyn Fn() + Send + Sync>,
    ) -> Result<Box<dyn RepeatingSignal>, CollaboratorError> {
        let handle = Handle::try_current().map_err(|_| CollaboratorError::NoRuntime("repeating signal"))?;
        let task = handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                action();
            }
        });
        Ok(Box::new(RepeatTask { task: Some(task) }))
    }
}

/// Aborts its task when stopped or dropped
#[derive(Debug)]
pub struct RepeatTask {
    task: Option<JoinHandle<()>>,
}

impl RepeatingSignal for RepeatTask {
    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RepeatTask {
    fn drop(&mut self) {
        self.stop();
    }
}
