//! Wall-clock driver for a scheduler

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::core::error::Result;
use crate::core::types::Tick;
use crate::intent::Intent;
use crate::scheduler::tick::TickScheduler;

/// Step `scheduler` every `turn_interval_ms` until `max_ticks` is reached
///
/// Intents arriving on `intents` are queued for the next tick. Without a
/// tick limit the session ends once every sender has been dropped and the
/// intents already queued have been resolved. A late
/// tick delays the following ones instead of bunching them up, so ticks
/// never overlap. A failed tick is retried on the next boundary up to
/// `max_stale_retries` times in a row before the error is returned.
pub async fn run_realtime(
    mut scheduler: TickScheduler,
    mut intents: mpsc::Receiver<Intent>,
    max_ticks: Option<Tick>,
) -> Result<TickScheduler> {
    let period = Duration::from_millis(scheduler.config().turn_interval_ms());
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let retry_limit = scheduler.config().session.max_stale_retries;
    let mut failures = 0u32;
    let mut accepting = true;

    info!(session = %scheduler.session_id(), ?period, "realtime loop started");
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match scheduler.step() {
                    Ok(_) => failures = 0,
                    Err(e) if failures < retry_limit => {
                        failures += 1;
                        warn!(error = %e, failures, "tick failed, retrying on next boundary");
                    }
                    Err(e) => return Err(e),
                }
                if max_ticks.is_some_and(|limit| scheduler.tick() >= limit) {
                    break;
                }
            }
            received = intents.recv(), if accepting => match received {
                Some(intent) => scheduler.submit(intent),
                None => {
                    accepting = false;
                    if max_ticks.is_none() {
                        // Resolve what was already queued before closing the session
                        if !scheduler.pending_intents().is_empty() {
                            interval.tick().await;
                            scheduler.step()?;
                        }
                        break;
                    }
                }
            },
        }
    }

    info!(tick = scheduler.tick(), "realtime loop stopped");
    Ok(scheduler)
}
