//! Target selection for computer players

use std::collections::BTreeSet;

use crate::core::types::{Owner, PlayerId, TileId};
use crate::world::WorldModel;

/// Where a player could push next
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpansionTargets {
    /// Unclaimed land bordering the player, lowest id first
    pub unclaimed: Vec<TileId>,
    /// Bordering players weaker than the player, weakest first: (tile, owner)
    pub weak_neighbors: Vec<(TileId, PlayerId)>,
}

/// Neighbours count as weak below this share of our troops
const WEAK_NEIGHBOR_PERCENT: u64 = 70;

pub fn find_expansion_targets(player: PlayerId, world: &WorldModel) -> ExpansionTargets {
    let Some(me) = world.player(player) else {
        return ExpansionTargets::default();
    };

    let mut unclaimed = BTreeSet::new();
    let mut bordering = BTreeSet::new();
    for &tile in &me.tiles {
        for &n in world.neighbors(tile) {
            if !world.is_capturable(n) {
                continue;
            }
            match world.owner(n) {
                Some(Owner::TerraNullius) => {
                    unclaimed.insert(n);
                }
                Some(Owner::Player(other)) if other != player => {
                    bordering.insert((other, n));
                }
                _ => {}
            }
        }
    }

    let mut weak_neighbors: Vec<(TileId, PlayerId, u64)> = Vec::new();
    let mut seen = BTreeSet::new();
    for (other, tile) in bordering {
        if !seen.insert(other) {
            continue;
        }
        let Some(them) = world.player(other) else {
            continue;
        };
        if them.troops * 100 < me.troops * WEAK_NEIGHBOR_PERCENT {
            weak_neighbors.push((tile, other, them.troops));
        }
    }
    weak_neighbors.sort_by_key(|&(tile, other, troops)| (troops, other, tile));

    ExpansionTargets {
        unclaimed: unclaimed.into_iter().collect(),
        weak_neighbors: weak_neighbors
            .into_iter()
            .map(|(tile, other, _)| (tile, other))
            .collect(),
    }
}

/// Unowned land tiles whose whole neighbourhood is unowned too
pub fn spawn_candidates(world: &WorldModel) -> Vec<TileId> {
    world
        .map()
        .tiles()
        .filter(|&t| world.is_capturable(t) && world.owner(t) == Some(Owner::TerraNullius))
        .filter(|&t| {
            world
                .neighbors(t)
                .iter()
                .all(|&n| world.owner(n) == Some(Owner::TerraNullius))
        })
        .collect()
}
