//! Boat attacks: sea reachability and single-shot landings

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::attack::{Attack, AttackKind, Conclusion};
use crate::core::config::Config;
use crate::core::error::{EngineError, Result};
use crate::core::types::{AttackId, Owner, PlayerId, TileId, Troops};
use crate::world::{Defender, Transfer, WorldModel};

/// Water tiles between `attacker`'s shore and `landing`, if a sea path exists
pub fn sea_route(world: &WorldModel, attacker: PlayerId, landing: TileId) -> Option<u32> {
    let shore = world.owned_shore(attacker);
    if shore.is_empty() {
        return None;
    }
    world.map().sea_distance(&shore, landing)
}

/// Ticks a boat spends at sea; never less than one
pub fn travel_ticks(distance: u32, boat_speed: u32) -> u64 {
    let speed = boat_speed.max(1);
    u64::from(distance.div_ceil(speed)).max(1)
}

/// Result of a boat reaching its beach
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingOutcome {
    pub attack: AttackId,
    pub tile: TileId,
    /// Owner of the beach when the landing was planned
    pub from: Owner,
    pub captured: bool,
    pub attacker_troop_loss: Troops,
    pub defender_troop_loss: Troops,
    /// Set when the boat does not continue inland
    pub conclusion: Option<Conclusion>,
}

/// Resolve the whole boat commitment against its landing tile in one contest
///
/// The beach is fought for against whoever holds it on arrival. A beach the
/// attacker already owns is an unopposed landing. Troops that fail to take
/// the beach are lost.
pub fn resolve_landing(attack: &Attack, world: &WorldModel, config: &Config) -> Result<LandingOutcome> {
    let AttackKind::Boat { landing, .. } = attack.kind else {
        return Err(EngineError::Config(format!("{} is not a boat attack", attack.id)));
    };
    let attacker = world
        .player(attack.attacker)
        .ok_or(EngineError::UnknownPlayer(attack.attacker))?;
    let from = world.owner(landing).ok_or(EngineError::UnknownTile(landing))?;

    let mut outcome = LandingOutcome {
        attack: attack.id,
        tile: landing,
        from,
        captured: false,
        attacker_troop_loss: 0,
        defender_troop_loss: 0,
        conclusion: None,
    };

    if !attacker.alive || attacker.tile_count() == 0 {
        outcome.conclusion = Some(Conclusion::AttackerEliminated);
        return Ok(outcome);
    }
    if attack.cancelled {
        outcome.conclusion = Some(Conclusion::Cancelled);
        return Ok(outcome);
    }
    if from == Owner::Player(attack.attacker) {
        outcome.captured = true;
        return Ok(outcome);
    }

    let tile = world.tile(landing).ok_or(EngineError::UnknownTile(landing))?;
    let mut boat = attacker.clone();
    boat.troops = attack.remaining;
    let defender = world.defender(from)?;
    let contest = config.player().attack_logic(&boat, defender, &tile);

    if contest.attacker_troop_loss >= attack.remaining {
        outcome.attacker_troop_loss = attack.remaining;
        outcome.conclusion = Some(Conclusion::LandingRepelled);
        return Ok(outcome);
    }
    outcome.attacker_troop_loss = contest.attacker_troop_loss;

    outcome.captured = match defender {
        Defender::TerraNullius => true,
        Defender::Player(def) => {
            let loss = contest.defender_troop_loss.min(def.troops);
            outcome.defender_troop_loss = loss;
            config.player().tile_defeated(def, loss)
        }
    };
    if !outcome.captured {
        outcome.attacker_troop_loss = attack.remaining;
        outcome.conclusion = Some(Conclusion::LandingRepelled);
    }

    debug!(
        attack = %attack.id,
        tile = %landing,
        captured = outcome.captured,
        "boat landing resolved"
    );
    Ok(outcome)
}

/// Apply a landing; a taken beach turns the boat into a land attack
pub fn commit_landing(world: &mut WorldModel, attack: &mut Attack, outcome: &LandingOutcome) -> Result<()> {
    let actual = world
        .owner(outcome.tile)
        .ok_or(EngineError::UnknownTile(outcome.tile))?;
    if actual != outcome.from {
        return Err(EngineError::StaleWorldState {
            attack: outcome.attack,
            tile: outcome.tile,
            expected: outcome.from,
            actual,
        });
    }

    let contested = matches!(
        outcome.conclusion,
        None | Some(Conclusion::LandingRepelled)
    ) && outcome.from != Owner::Player(attack.attacker);
    if contested {
        let to = if outcome.captured {
            Owner::Player(attack.attacker)
        } else {
            outcome.from
        };
        world.transfer(Transfer {
            tile: outcome.tile,
            from: outcome.from,
            to,
            attacker: Some(attack.attacker),
            attacker_delta: 0,
            defender_delta: -(outcome.defender_troop_loss as i64),
        })?;
    }

    attack.spend(outcome.attacker_troop_loss);
    if outcome.captured {
        attack.kind = AttackKind::Land;
        attack.target = outcome.tile;
        // Inland the boat keeps fighting whoever held the beach
        if outcome.from != Owner::Player(attack.attacker) {
            attack.defender = outcome.from;
        }
    }
    Ok(())
}
