//! Intent - a player command waiting for admission

use serde::{Deserialize, Serialize};

use crate::core::types::{AttackId, PlayerId, TileId, Troops};
use crate::world::UnitKind;

/// A discrete action request from a player or bot
///
/// `troops: None` lets the balance policy pick the commitment
/// (`attack_amount` / `boat_attack_amount`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Claim a starting position
    Spawn { player: PlayerId, tile: TileId },

    /// Expand across the border towards the owner of `target`
    LandAttack {
        player: PlayerId,
        target: TileId,
        troops: Option<Troops>,
    },

    /// Ship troops to the shore tile `target`
    BoatAttack {
        player: PlayerId,
        target: TileId,
        troops: Option<Troops>,
    },

    CancelAttack { player: PlayerId, attack: AttackId },

    /// Build menu entry; a `Nuke` is launched at `tile` rather than stationed
    BuildUnit {
        player: PlayerId,
        unit: UnitKind,
        tile: TileId,
    },

    SendNuke { player: PlayerId, target: TileId },
}

impl Intent {
    /// The acting player
    pub fn player(&self) -> PlayerId {
        match self {
            Intent::Spawn { player, .. }
            | Intent::LandAttack { player, .. }
            | Intent::BoatAttack { player, .. }
            | Intent::CancelAttack { player, .. }
            | Intent::BuildUnit { player, .. }
            | Intent::SendNuke { player, .. } => *player,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Intent::Spawn { .. } => "spawn",
            Intent::LandAttack { .. } => "land_attack",
            Intent::BoatAttack { .. } => "boat_attack",
            Intent::CancelAttack { .. } => "cancel_attack",
            Intent::BuildUnit { .. } => "build_unit",
            Intent::SendNuke { .. } => "send_nuke",
        }
    }
}
