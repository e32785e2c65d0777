//! Per-tick resolution of a land attack
//!
//! [`resolve_step`] is a pure function of the attack, a world snapshot and
//! the configuration. It plans every contest of the tick without touching
//! the world. [`commit_step`] then checks that the plan still matches the
//! world and writes it through the transfer primitive.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::combat::attack::{Attack, Conclusion};
use crate::core::config::Config;
use crate::core::error::{EngineError, Result};
use crate::core::types::{AttackId, Owner, PlayerId, TileId, Troops};
use crate::world::{Defender, Player, Transfer, WorldModel};

/// One tile contest planned by a step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub tile: TileId,
    /// Owner the plan was computed against
    pub from: Owner,
    pub captured: bool,
    pub attacker_troop_loss: Troops,
    pub defender_troop_loss: Troops,
}

/// Everything one attack does in one tick
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub attack: AttackId,
    pub attacker_troop_loss: Troops,
    pub defender_troop_loss: Troops,
    pub tiles_captured: Vec<TileId>,
    pub contests: Vec<Contest>,
    pub tiles_per_tick_used: u32,
    pub attack_exhausted: bool,
    pub conclusion: Option<Conclusion>,
}

impl StepOutcome {
    pub(crate) fn concluded(attack: AttackId, conclusion: Conclusion) -> Self {
        Self {
            attack,
            attacker_troop_loss: 0,
            defender_troop_loss: 0,
            tiles_captured: Vec::new(),
            contests: Vec::new(),
            tiles_per_tick_used: 0,
            attack_exhausted: true,
            conclusion: Some(conclusion),
        }
    }
}

/// Plan one tick of `attack` against `world`
///
/// Frontier tiles are contested lowest id first. Tiles captured during the
/// step extend the frontier. A contest is only taken when its budget cost
/// still fits; costlier tiles are passed over. The step stops when the tile
/// budget is spent, when nothing capturable is left, or when the remaining
/// committed troops cannot pay for the next contest. An attack whose every
/// frontier tile costs more than a whole tick's budget concludes with
/// `NoTargets`.
pub fn resolve_step(attack: &Attack, world: &WorldModel, config: &Config) -> Result<StepOutcome> {
    let attacker = world
        .player(attack.attacker)
        .ok_or(EngineError::UnknownPlayer(attack.attacker))?;

    if !attacker.alive || attacker.tile_count() == 0 {
        return Ok(StepOutcome::concluded(attack.id, Conclusion::AttackerEliminated));
    }
    if attack.cancelled {
        return Ok(StepOutcome::concluded(attack.id, Conclusion::Cancelled));
    }
    if attack.remaining == 0 {
        return Ok(StepOutcome::concluded(attack.id, Conclusion::TroopsExhausted));
    }

    let defender_snapshot = match world.defender(attack.defender)? {
        Defender::Player(p) if !p.alive => {
            return Ok(StepOutcome::concluded(attack.id, Conclusion::NoTargets))
        }
        other => other.player().cloned(),
    };

    let mut frontier = world.frontier(attack.attacker, attack.defender);
    if frontier.is_empty() {
        return Ok(StepOutcome::concluded(attack.id, Conclusion::NoTargets));
    }

    // Working copies so that each contest sees the effect of the previous ones.
    // The attacker fights with the troops committed to this attack.
    let mut attacker_view: Player = attacker.clone();
    attacker_view.troops = attack.remaining;

    let policy = config.player();
    let budget = policy.attack_tiles_per_tick(
        &attacker_view,
        as_defender(defender_snapshot.as_ref()),
        frontier.len(),
    );

    let mut defender_view = defender_snapshot;
    let mut visited: BTreeSet<TileId> = BTreeSet::new();

    let mut outcome = StepOutcome {
        attack: attack.id,
        attacker_troop_loss: 0,
        defender_troop_loss: 0,
        tiles_captured: Vec::new(),
        contests: Vec::new(),
        tiles_per_tick_used: 0,
        attack_exhausted: false,
        conclusion: None,
    };
    let mut remaining = attack.remaining;
    let mut held_any = false;
    let mut over_budget = false;

    while outcome.tiles_per_tick_used < budget {
        let Some(tile_id) = frontier.pop_first() else {
            break;
        };
        visited.insert(tile_id);
        let tile = world.tile(tile_id).ok_or(EngineError::UnknownTile(tile_id))?;

        attacker_view.troops = remaining;
        let contest = policy.attack_logic(&attacker_view, as_defender(defender_view.as_ref()), &tile);
        let cost = contest.tiles_per_tick_used.max(1);
        if outcome.tiles_per_tick_used + cost > budget {
            // Too expensive for what is left of the budget; cheaper tiles may still fit
            over_budget = true;
            continue;
        }
        if contest.attacker_troop_loss >= remaining {
            outcome.conclusion = Some(Conclusion::TroopsExhausted);
            break;
        }

        remaining -= contest.attacker_troop_loss;
        outcome.attacker_troop_loss += contest.attacker_troop_loss;
        outcome.tiles_per_tick_used += cost;

        let (defender_loss, captured) = match defender_view.as_mut() {
            None => (0, true),
            Some(def) => {
                let loss = contest.defender_troop_loss.min(def.troops);
                let captured = policy.tile_defeated(def, loss);
                def.troops -= loss;
                if captured {
                    def.tiles.remove(&tile_id);
                }
                (loss, captured)
            }
        };
        outcome.defender_troop_loss += defender_loss;

        outcome.contests.push(Contest {
            tile: tile_id,
            from: attack.defender,
            captured,
            attacker_troop_loss: contest.attacker_troop_loss,
            defender_troop_loss: defender_loss,
        });

        if captured {
            outcome.tiles_captured.push(tile_id);
            attacker_view.tiles.insert(tile_id);
            for &n in world.neighbors(tile_id) {
                if !visited.contains(&n)
                    && world.owner(n) == Some(attack.defender)
                    && world.is_capturable(n)
                {
                    frontier.insert(n);
                }
            }
        } else {
            held_any = true;
        }
    }

    if outcome.conclusion.is_none() {
        if remaining == 0 {
            outcome.conclusion = Some(Conclusion::TroopsExhausted);
        } else if outcome.contests.is_empty() && over_budget {
            // No frontier tile fits in a whole tick's budget
            outcome.conclusion = Some(Conclusion::NoTargets);
        } else if frontier.is_empty() && !held_any && !over_budget {
            outcome.conclusion = Some(Conclusion::NoTargets);
        }
    }
    outcome.attack_exhausted = outcome.conclusion.is_some();

    trace!(
        attack = %attack.id,
        captured = outcome.tiles_captured.len(),
        attacker_loss = outcome.attacker_troop_loss,
        defender_loss = outcome.defender_troop_loss,
        "attack step resolved"
    );
    Ok(outcome)
}

fn as_defender(player: Option<&Player>) -> Defender<'_> {
    match player {
        Some(p) => Defender::Player(p),
        None => Defender::TerraNullius,
    }
}

/// Check that every planned contest still matches the world
///
/// Each tile must still be held by the owner the plan saw, and each capture
/// must border `attacker` territory once the earlier captures of the same
/// step are in place.
pub fn verify_step(world: &WorldModel, attacker: PlayerId, outcome: &StepOutcome) -> Result<()> {
    let mut gained: BTreeSet<TileId> = BTreeSet::new();
    for contest in &outcome.contests {
        let actual = world
            .owner(contest.tile)
            .ok_or(EngineError::UnknownTile(contest.tile))?;
        let adjacent = world.borders(attacker, contest.tile)
            || world
                .neighbors(contest.tile)
                .iter()
                .any(|n| gained.contains(n));
        if actual != contest.from || !adjacent {
            return Err(EngineError::StaleWorldState {
                attack: outcome.attack,
                tile: contest.tile,
                expected: contest.from,
                actual,
            });
        }
        if contest.captured {
            gained.insert(contest.tile);
        }
    }
    Ok(())
}

/// Apply a planned step to the world and to the attack's troop pool
///
/// Fails with `StaleWorldState`, leaving both untouched, when another
/// attack already changed one of the contested tiles this tick.
pub fn commit_step(world: &mut WorldModel, attack: &mut Attack, outcome: &StepOutcome) -> Result<()> {
    verify_step(world, attack.attacker, outcome)?;

    for contest in &outcome.contests {
        let to = if contest.captured {
            Owner::Player(attack.attacker)
        } else {
            contest.from
        };
        world.transfer(Transfer {
            tile: contest.tile,
            from: contest.from,
            to,
            attacker: Some(attack.attacker),
            attacker_delta: 0,
            defender_delta: -(contest.defender_troop_loss as i64),
        })?;
    }

    attack.spend(outcome.attacker_troop_loss);
    Ok(())
}
