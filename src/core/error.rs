use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{AttackId, Gold, Owner, PlayerId, TileId, Troops};
use crate::world::UnitKind;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid transfer of {tile}: expected owner {expected}, found {actual}")]
    InvalidTransfer {
        tile: TileId,
        expected: Owner,
        actual: Owner,
    },

    #[error("Stale world state for {attack}: {tile} expected {expected}, found {actual}")]
    StaleWorldState {
        attack: AttackId,
        tile: TileId,
        expected: Owner,
        actual: Owner,
    },

    #[error("Invalid tick count: {0}")]
    InvalidTick(u64),

    #[error("Illegal action: {0}")]
    IllegalAction(#[from] Rejection),

    #[error("Player not found: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Tile not found: {0}")]
    UnknownTile(TileId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Map error: {0}")]
    Map(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Why an intent was refused at admission
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    #[error("{player} has {available} troops, needs {required}")]
    InsufficientTroops {
        player: PlayerId,
        available: Troops,
        required: Troops,
    },

    #[error("{player} has {available} gold, needs {required}")]
    InsufficientGold {
        player: PlayerId,
        available: Gold,
        required: Gold,
    },

    #[error("{0} is not alive")]
    PlayerNotAlive(PlayerId),

    #[error("{0} has already spawned")]
    AlreadySpawned(PlayerId),

    #[error("{0} cannot be claimed")]
    NotClaimable(TileId),

    #[error("{player} does not own {tile}")]
    NotOwned { player: PlayerId, tile: TileId },

    #[error("{player} already owns {tile}")]
    AlreadyOwned { player: PlayerId, tile: TileId },

    #[error("{tile} does not border territory of {player}")]
    NotAdjacent { player: PlayerId, tile: TileId },

    #[error("{0} is not a shore tile")]
    NotShore(TileId),

    #[error("{tile} cannot be reached by sea from {player}")]
    Unreachable { player: PlayerId, tile: TileId },

    #[error("{player} needs a {} to do that", .requirement.name())]
    MissingUnit {
        player: PlayerId,
        requirement: UnitKind,
    },

    #[error("Attack not found for {player}: {attack}")]
    UnknownAttack { player: PlayerId, attack: AttackId },

    #[error("Committed troops must be positive")]
    EmptyCommitment,

    #[error("Player not found: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Tile not found: {0}")]
    UnknownTile(TileId),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages_name_the_subject() {
        assert_eq!(
            Rejection::PlayerNotAlive(PlayerId(3)).to_string(),
            "player#3 is not alive"
        );
        assert_eq!(
            Rejection::AlreadySpawned(PlayerId(1)).to_string(),
            "player#1 has already spawned"
        );
        assert_eq!(
            Rejection::NotClaimable(TileId(7)).to_string(),
            "tile#7 cannot be claimed"
        );
        assert_eq!(
            Rejection::NotShore(TileId(9)).to_string(),
            "tile#9 is not a shore tile"
        );
        let missing = Rejection::MissingUnit {
            player: PlayerId(2),
            requirement: UnitKind::MissileSilo,
        };
        assert!(missing.to_string().starts_with("player#2 needs a "));
    }
}
