//! Nuke detonation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::config::Config;
use crate::core::error::{EngineError, Result};
use crate::core::types::{Owner, PlayerId, TileId, Troops, UnitId};
use crate::world::{Transfer, WorldModel};

/// A launched nuke waiting to detonate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detonation {
    pub launcher: PlayerId,
    pub target: TileId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastedTile {
    pub tile: TileId,
    pub from: PlayerId,
    /// Garrison wiped out on this tile
    pub troop_loss: Troops,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastOutcome {
    pub tiles: Vec<BlastedTile>,
    pub troop_losses: BTreeMap<PlayerId, Troops>,
}

/// Every player-owned tile within the blast radius, lowest id first
pub fn resolve_detonation(nuke: &Detonation, world: &WorldModel, config: &Config) -> Result<BlastOutcome> {
    if !world.map().contains(nuke.target) {
        return Err(EngineError::UnknownTile(nuke.target));
    }
    let radius = config.player().nuke_radius();

    let mut outcome = BlastOutcome::default();
    for tile in world.map().within_radius(nuke.target, radius) {
        let Some(Owner::Player(owner)) = world.owner(tile) else {
            continue;
        };
        let garrison = world
            .player(owner)
            .map(|p| p.garrison())
            .ok_or(EngineError::UnknownPlayer(owner))?;
        outcome.tiles.push(BlastedTile {
            tile,
            from: owner,
            troop_loss: garrison,
        });
        *outcome.troop_losses.entry(owner).or_insert(0) += garrison;
    }
    Ok(outcome)
}

/// Revert the blasted tiles to TerraNullius; returns the destroyed units
pub fn commit_detonation(world: &mut WorldModel, nuke: &Detonation, outcome: &BlastOutcome) -> Result<Vec<UnitId>> {
    let mut destroyed = Vec::new();
    for blasted in &outcome.tiles {
        destroyed.extend(world.units_on(blasted.tile).map(|u| u.id));
        world.transfer(Transfer {
            tile: blasted.tile,
            from: Owner::Player(blasted.from),
            to: Owner::TerraNullius,
            attacker: None,
            attacker_delta: 0,
            defender_delta: -(blasted.troop_loss as i64),
        })?;
    }
    info!(
        launcher = %nuke.launcher,
        target = %nuke.target,
        tiles = outcome.tiles.len(),
        units = destroyed.len(),
        "nuke detonated"
    );
    Ok(destroyed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerInfo;
    use crate::world::{GameMap, UnitKind};

    #[test]
    fn test_blast_clears_tiles_and_units() {
        let mut world = WorldModel::new(GameMap::land(9, 1));
        let a = world.add_player(PlayerInfo::human("a"));
        let b = world.add_player(PlayerInfo::human("b"));
        world.claim_spawn(a, TileId(0), 100, 0).unwrap();
        world.claim_spawn(b, TileId(5), 90, 0).unwrap();
        let silo = world.add_unit(UnitKind::MissileSilo, b, TileId(4));

        let nuke = Detonation {
            launcher: a,
            target: TileId(5),
        };
        let outcome = resolve_detonation(&nuke, &world, &Config::default()).unwrap();
        // Radius 2 around tile 5 covers 3..=7; b owns 4, 5 and 6
        assert_eq!(
            outcome.tiles.iter().map(|t| t.tile).collect::<Vec<_>>(),
            vec![TileId(4), TileId(5), TileId(6)]
        );

        let destroyed = commit_detonation(&mut world, &nuke, &outcome).unwrap();
        assert_eq!(destroyed, vec![silo]);
        assert_eq!(world.player(b).unwrap().tile_count(), 0);
        assert_eq!(world.player(b).unwrap().troops, 0);
        assert_eq!(world.owner(TileId(1)), Some(Owner::Player(a)));
    }
}
