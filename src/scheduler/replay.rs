//! Intent logs and deterministic replay

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{PlayerInfo, Tick};
use crate::intent::Intent;
use crate::scheduler::tick::TickScheduler;
use crate::world::GameMap;

/// Intents resolved in one tick, in submission order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedTick {
    pub tick: Tick,
    pub intents: Vec<Intent>,
}

/// Everything needed to rebuild a session from its map and configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentLog {
    /// Registration order decides player ids
    pub players: Vec<PlayerInfo>,
    pub ticks: Vec<LoggedTick>,
    pub last_tick: Tick,
}

impl IntentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, info: PlayerInfo) {
        self.players.push(info);
    }

    /// Record a completed tick; empty ticks only move `last_tick`
    pub fn record(&mut self, tick: Tick, intents: Vec<Intent>) {
        if !intents.is_empty() {
            self.ticks.push(LoggedTick { tick, intents });
        }
        self.last_tick = self.last_tick.max(tick);
    }

    pub fn intent_count(&self) -> usize {
        self.ticks.iter().map(|t| t.intents.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Re-run a logged session against a fresh world
///
/// The returned scheduler sits at `log.last_tick` with the same ownership
/// map and ledger the original session had at that tick.
pub fn replay(map: Arc<GameMap>, config: Config, log: &IntentLog) -> Result<TickScheduler> {
    let mut scheduler = TickScheduler::with_shared_map(map, config)?;
    for info in &log.players {
        scheduler.add_player(info.clone());
    }

    let mut pending = log.ticks.iter().peekable();
    for tick in 1..=log.last_tick {
        while let Some(logged) = pending.next_if(|t| t.tick == tick) {
            for intent in &logged.intents {
                scheduler.submit(intent.clone());
            }
        }
        scheduler.step()?;
    }

    info!(
        ticks = log.last_tick,
        intents = log.intent_count(),
        "replay complete"
    );
    Ok(scheduler)
}
