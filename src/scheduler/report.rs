//! Tick reports and the observer surface

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::combat::Conclusion;
use crate::core::error::Rejection;
use crate::core::types::{AttackId, Owner, PlayerId, Tick, TileId, Troops, UnitId};
use crate::intent::{Admission, Intent};
use crate::world::PlayerSummary;

/// A tile that changed hands during a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipChange {
    pub tile: TileId,
    pub from: Owner,
    pub to: Owner,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    IntentAdmitted {
        intent: Intent,
        admission: Admission,
    },
    IntentRejected {
        intent: Intent,
        reason: Rejection,
    },
    BoatLanded {
        attack: AttackId,
        tile: TileId,
        captured: bool,
    },
    AttackConcluded {
        attack: AttackId,
        attacker: PlayerId,
        reason: Conclusion,
        refunded: Troops,
    },
    NukeDetonated {
        launcher: PlayerId,
        target: TileId,
        tiles: usize,
        destroyed_units: Vec<UnitId>,
    },
    PlayerEliminated {
        player: PlayerId,
    },
}

/// Everything observers learn about one completed tick
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub session: Uuid,
    pub tick: Tick,
    pub ownership_changes: Vec<OwnershipChange>,
    pub players: Vec<PlayerSummary>,
    pub events: Vec<EngineEvent>,
    pub active_attacks: usize,
    /// Stale outcomes re-resolved during this tick
    pub stale_retries: u32,
}

impl TickReport {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn rejections(&self) -> impl Iterator<Item = (&Intent, &Rejection)> {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::IntentRejected { intent, reason } => Some((intent, reason)),
            _ => None,
        })
    }

    pub fn conclusions(&self) -> impl Iterator<Item = (AttackId, Conclusion)> + '_ {
        self.events.iter().filter_map(|e| match e {
            EngineEvent::AttackConcluded { attack, reason, .. } => Some((*attack, *reason)),
            _ => None,
        })
    }
}

/// Read-only consumer of completed ticks (renderer, transport)
pub trait TickObserver: Send {
    fn on_tick(&mut self, report: &TickReport);
}

impl<F> TickObserver for F
where
    F: FnMut(&TickReport) + Send,
{
    fn on_tick(&mut self, report: &TickReport) {
        self(report)
    }
}
