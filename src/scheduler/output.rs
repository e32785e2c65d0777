//! Simulation output and serialization

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduler::replay::IntentLog;
use crate::scheduler::tick::{SchedulerStats, TickScheduler};
use crate::world::{PlayerSummary, WorldSnapshot};

/// Complete result of a headless run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub session: Uuid,
    pub final_world: WorldSnapshot,
    pub intents: IntentLog,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationStats {
    pub ticks_simulated: u64,
    pub simulation_time_ms: u64,
    pub players_at_start: u32,
    pub players_at_end: u32,
    pub tiles_claimed: u32,
    pub scheduler: SchedulerStats,
}

impl SimulationOutput {
    pub fn new(scheduler: &TickScheduler, elapsed: Duration) -> Self {
        let final_world = scheduler.snapshot();
        let players_at_start = final_world.players.len() as u32;
        let players_at_end = final_world.players.iter().filter(|p| p.alive).count() as u32;
        let tiles_claimed = final_world
            .owners
            .iter()
            .filter(|o| !o.is_terra_nullius())
            .count() as u32;

        Self {
            session: scheduler.session_id(),
            final_world,
            intents: scheduler.intent_log().clone(),
            statistics: SimulationStats {
                ticks_simulated: scheduler.tick(),
                simulation_time_ms: elapsed.as_millis() as u64,
                players_at_start,
                players_at_end,
                tiles_claimed,
                scheduler: scheduler.stats().clone(),
            },
        }
    }

    /// Players ordered by territory, largest first
    pub fn leaderboard(&self) -> Vec<&PlayerSummary> {
        let mut players: Vec<&PlayerSummary> = self.final_world.players.iter().collect();
        players.sort_by(|a, b| b.tiles.cmp(&a.tiles).then(a.id.cmp(&b.id)));
        players
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Simulated {} ticks in {}ms\n{} of {} players alive, {} tiles claimed, {} attacks concluded, {} intents rejected",
            self.statistics.ticks_simulated,
            self.statistics.simulation_time_ms,
            self.statistics.players_at_end,
            self.statistics.players_at_start,
            self.statistics.tiles_claimed,
            self.statistics.scheduler.attacks_concluded,
            self.statistics.scheduler.intents_rejected,
        );
        for p in self.leaderboard().into_iter().take(5) {
            out.push_str(&format!(
                "\n  {:<12} {:>5} tiles {:>8} troops {:>6} gold{}",
                p.name,
                p.tiles,
                p.troops,
                p.gold,
                if p.alive { "" } else { " (eliminated)" }
            ));
        }
        out
    }
}
