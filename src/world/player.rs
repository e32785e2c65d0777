//! Player - a participant with a troop and gold ledger

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{Gold, PlayerId, PlayerInfo, TileId, Troops};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub info: PlayerInfo,
    pub troops: Troops,
    pub gold: Gold,
    pub tiles: BTreeSet<TileId>,
    /// Has claimed a starting position
    pub spawned: bool,
    /// Cleared once a spawned player owns no tiles
    pub alive: bool,
}

impl Player {
    pub fn new(id: PlayerId, info: PlayerInfo) -> Self {
        Self {
            id,
            info,
            troops: 0,
            gold: 0,
            tiles: BTreeSet::new(),
            spawned: false,
            alive: true,
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn owns(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile)
    }

    /// Troops standing on each owned tile
    pub fn garrison(&self) -> Troops {
        self.troops / self.tile_count().max(1) as Troops
    }
}

/// The other side of an attack
#[derive(Clone, Copy, Debug)]
pub enum Defender<'a> {
    TerraNullius,
    Player(&'a Player),
}

impl<'a> Defender<'a> {
    pub fn player(self) -> Option<&'a Player> {
        match self {
            Defender::Player(p) => Some(p),
            Defender::TerraNullius => None,
        }
    }
}
