//! Serializable world state handed to observers

use serde::{Deserialize, Serialize};

use crate::core::types::{Gold, Owner, PlayerId, TileId, Troops};
use crate::world::unit::Unit;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub troops: Troops,
    pub gold: Gold,
    pub tiles: usize,
    pub alive: bool,
}

/// Ownership map and ledger at the end of a tick
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub owners: Vec<Owner>,
    pub players: Vec<PlayerSummary>,
    pub units: Vec<Unit>,
}

impl WorldSnapshot {
    pub fn owner(&self, tile: TileId) -> Option<Owner> {
        self.owners.get(tile.index()).copied()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
