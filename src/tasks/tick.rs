//! Periodic tick driver

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that advances the boil timer every `period`
pub async fn tick_task(state: Arc<AppState>, period: Duration) {
    info!("Starting tick task ({}ms interval)", period.as_millis());

    let mut ticker = interval(period);
    // Crossings are detected on absolute elapsed time, so skipped ticks lose nothing.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut finished = false;

    loop {
        ticker.tick().await;

        let report = match state.tick() {
            Ok(report) => report,
            Err(e) => {
                error!("Tick failed: {}", e);
                continue;
            }
        };

        for event in &report.events {
            debug!(
                "Fired {} alert for '{}' at {}s",
                event.kind.as_str(),
                event.stage.label,
                report.elapsed_seconds
            );
        }

        if report.finished && !finished {
            state.finish();
        }
        finished = report.finished;
    }
}
