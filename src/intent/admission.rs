//! Admission rules
//!
//! Every check runs before the first mutation, so a rejected intent leaves
//! the world and the attack book exactly as they were.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::{sea_route, travel_ticks, Attack, AttackBook, Detonation};
use crate::core::config::Config;
use crate::core::error::Rejection;
use crate::core::types::{AttackId, Owner, PlayerId, Tick, TileId, Troops, UnitId};
use crate::intent::action::Intent;
use crate::world::{Player, TerrainKind, UnitKind, WorldModel};

/// What an admitted intent turned into
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Admission {
    Spawned {
        player: PlayerId,
        tiles: Vec<TileId>,
    },
    AttackLaunched {
        attack: AttackId,
        troops: Troops,
    },
    /// Troops added to an attack already running against the same defender
    Reinforced {
        attack: AttackId,
        troops: Troops,
    },
    CancelRequested {
        attack: AttackId,
    },
    UnitBuilt {
        unit: UnitId,
        kind: UnitKind,
        tile: TileId,
    },
    NukeLaunched(Detonation),
}

type Admit<T> = std::result::Result<T, Rejection>;

/// Validate `intent` against the world and apply it
pub fn admit(
    intent: &Intent,
    world: &mut WorldModel,
    attacks: &mut AttackBook,
    config: &Config,
    tick: Tick,
) -> Admit<Admission> {
    let admission = match *intent {
        Intent::Spawn { player, tile } => admit_spawn(world, config, player, tile)?,
        Intent::LandAttack {
            player,
            target,
            troops,
        } => admit_land_attack(world, attacks, config, tick, player, target, troops)?,
        Intent::BoatAttack {
            player,
            target,
            troops,
        } => admit_boat_attack(world, attacks, config, tick, player, target, troops)?,
        Intent::CancelAttack { player, attack } => {
            let entry = attacks
                .get_mut(attack)
                .filter(|a| a.attacker == player)
                .ok_or(Rejection::UnknownAttack { player, attack })?;
            entry.cancelled = true;
            Admission::CancelRequested { attack }
        }
        Intent::BuildUnit {
            player,
            unit: UnitKind::Nuke,
            tile,
        }
        | Intent::SendNuke {
            player,
            target: tile,
        } => admit_nuke(world, config, player, tile)?,
        Intent::BuildUnit { player, unit, tile } => {
            admit_build(world, config, player, unit, tile)?
        }
    };
    debug!(player = %intent.player(), kind = intent.kind(), "intent admitted");
    Ok(admission)
}

fn living_player(world: &WorldModel, player: PlayerId) -> Admit<&Player> {
    let p = world
        .player(player)
        .ok_or(Rejection::UnknownPlayer(player))?;
    if !p.alive {
        return Err(Rejection::PlayerNotAlive(player));
    }
    Ok(p)
}

fn owner_of(world: &WorldModel, tile: TileId) -> Admit<Owner> {
    world.owner(tile).ok_or(Rejection::UnknownTile(tile))
}

fn check_commitment(player: &Player, troops: Troops) -> Admit<()> {
    if troops == 0 {
        return Err(Rejection::EmptyCommitment);
    }
    if troops > player.troops {
        return Err(Rejection::InsufficientTroops {
            player: player.id,
            available: player.troops,
            required: troops,
        });
    }
    Ok(())
}

fn admit_spawn(world: &mut WorldModel, config: &Config, player: PlayerId, tile: TileId) -> Admit<Admission> {
    let info = living_player(world, player)?.info.clone();
    owner_of(world, tile)?;
    let policy = config.player();
    let tiles = world.claim_spawn(player, tile, policy.start_troops(&info), policy.start_gold(&info))?;
    Ok(Admission::Spawned { player, tiles })
}

fn admit_land_attack(
    world: &mut WorldModel,
    attacks: &mut AttackBook,
    config: &Config,
    tick: Tick,
    player: PlayerId,
    target: TileId,
    troops: Option<Troops>,
) -> Admit<Admission> {
    let attacker = living_player(world, player)?;
    let defender = owner_of(world, target)?;
    if defender == Owner::Player(player) {
        return Err(Rejection::AlreadyOwned { player, tile: target });
    }
    if !world.is_capturable(target) {
        return Err(Rejection::NotClaimable(target));
    }
    if !world.borders(player, target) {
        return Err(Rejection::NotAdjacent { player, tile: target });
    }
    let defender_view = world
        .defender(defender)
        .map_err(|_| Rejection::UnknownTile(target))?;
    let amount = troops.unwrap_or_else(|| config.player().attack_amount(attacker, defender_view));
    check_commitment(attacker, amount)?;

    world.commit_troops(player, amount)?;

    if let Some(id) = attacks.land_attack_between(player, defender) {
        if let Some(running) = attacks.get_mut(id) {
            running.reinforce(amount);
            return Ok(Admission::Reinforced { attack: id, troops: amount });
        }
    }
    let id = attacks.next_id();
    attacks.insert(Attack::land(id, player, defender, target, amount, tick));
    Ok(Admission::AttackLaunched { attack: id, troops: amount })
}

fn admit_boat_attack(
    world: &mut WorldModel,
    attacks: &mut AttackBook,
    config: &Config,
    tick: Tick,
    player: PlayerId,
    target: TileId,
    troops: Option<Troops>,
) -> Admit<Admission> {
    let attacker = living_player(world, player)?;
    let defender = owner_of(world, target)?;
    if world.terrain(target) != Some(TerrainKind::Shore) {
        return Err(Rejection::NotShore(target));
    }
    if defender == Owner::Player(player) {
        return Err(Rejection::AlreadyOwned { player, tile: target });
    }
    let distance = sea_route(world, player, target).ok_or(Rejection::Unreachable { player, tile: target })?;
    let defender_view = world
        .defender(defender)
        .map_err(|_| Rejection::UnknownTile(target))?;
    let amount = troops.unwrap_or_else(|| config.player().boat_attack_amount(attacker, defender_view));
    check_commitment(attacker, amount)?;

    world.commit_troops(player, amount)?;

    let arrives_at = tick + travel_ticks(distance, config.player().boat_speed());
    let id = attacks.next_id();
    attacks.insert(Attack::boat(id, player, defender, target, amount, tick, arrives_at));
    Ok(Admission::AttackLaunched { attack: id, troops: amount })
}

fn admit_build(
    world: &mut WorldModel,
    config: &Config,
    player: PlayerId,
    kind: UnitKind,
    tile: TileId,
) -> Admit<Admission> {
    living_player(world, player)?;
    if owner_of(world, tile)? != Owner::Player(player) {
        return Err(Rejection::NotOwned { player, tile });
    }
    match kind {
        UnitKind::Port => {
            if world.terrain(tile) != Some(TerrainKind::Shore) {
                return Err(Rejection::NotShore(tile));
            }
        }
        UnitKind::Destroyer => {
            let has_port = world
                .units_on(tile)
                .any(|u| u.owner == player && u.kind == UnitKind::Port);
            if !has_port {
                return Err(Rejection::MissingUnit {
                    player,
                    requirement: UnitKind::Port,
                });
            }
        }
        UnitKind::MissileSilo | UnitKind::Nuke => {}
    }

    world.spend_gold(player, config.player().unit_cost(kind))?;
    let unit = world.add_unit(kind, player, tile);
    Ok(Admission::UnitBuilt { unit, kind, tile })
}

fn admit_nuke(world: &mut WorldModel, config: &Config, player: PlayerId, target: TileId) -> Admit<Admission> {
    living_player(world, player)?;
    owner_of(world, target)?;
    if world.units_of(player, UnitKind::MissileSilo).next().is_none() {
        return Err(Rejection::MissingUnit {
            player,
            requirement: UnitKind::MissileSilo,
        });
    }

    world.spend_gold(player, config.player().unit_cost(UnitKind::Nuke))?;
    Ok(Admission::NukeLaunched(Detonation {
        launcher: player,
        target,
    }))
}
