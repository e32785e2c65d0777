//! Core type definitions used throughout the engine

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Simulation tick counter
pub type Tick = u64;

/// Troop amounts are whole soldiers so that every replica computes the same numbers
pub type Troops = u64;

/// Gold amounts
pub type Gold = u64;

/// Unique identifier for players
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display(fmt = "player#{}", _0)]
pub struct PlayerId(pub u16);

/// Index of a tile in the map grid
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display(fmt = "tile#{}", _0)]
pub struct TileId(pub u32);

impl TileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of an attack, assigned in admission order
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display(fmt = "attack#{}", _0)]
pub struct AttackId(pub u32);

/// Identifier of a built unit
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display(fmt = "unit#{}", _0)]
pub struct UnitId(pub u32);

/// Who holds a tile
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Owner {
    /// Unclaimed land; never holds troops
    #[display(fmt = "terra nullius")]
    TerraNullius,
    #[display(fmt = "{}", _0)]
    Player(PlayerId),
}

impl Owner {
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Owner::Player(id) => Some(id),
            Owner::TerraNullius => None,
        }
    }

    pub fn is_terra_nullius(self) -> bool {
        matches!(self, Owner::TerraNullius)
    }
}

impl From<PlayerId> for Owner {
    fn from(id: PlayerId) -> Self {
        Owner::Player(id)
    }
}

/// Whether a player is controlled by a person or by the engine's bots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlayerType {
    #[default]
    Human,
    Bot,
}

/// Starting conditions of a player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub player_type: PlayerType,
}

impl PlayerInfo {
    pub fn new(name: impl Into<String>, player_type: PlayerType) -> Self {
        Self {
            name: name.into(),
            player_type,
        }
    }

    pub fn human(name: impl Into<String>) -> Self {
        Self::new(name, PlayerType::Human)
    }

    pub fn bot(name: impl Into<String>) -> Self {
        Self::new(name, PlayerType::Bot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_ordering_puts_terra_nullius_first() {
        assert!(Owner::TerraNullius < Owner::Player(PlayerId(0)));
        assert!(Owner::Player(PlayerId(1)) < Owner::Player(PlayerId(2)));
    }

    #[test]
    fn test_display() {
        assert_eq!(PlayerId(3).to_string(), "player#3");
        assert_eq!(Owner::Player(PlayerId(3)).to_string(), "player#3");
        assert_eq!(Owner::TerraNullius.to_string(), "terra nullius");
        assert_eq!(TileId(12).to_string(), "tile#12");
    }
}
