//! Per-tick economy pass over every living player

use rayon::prelude::*;

use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{Gold, PlayerId, Troops};
use crate::economy::{earn, grow};
use crate::world::{Player, WorldModel};

/// Ledger changes for one player, computed from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthUpdate {
    pub player: PlayerId,
    /// New troop count
    pub troops: Troops,
    /// Gold to credit
    pub income: Gold,
}

/// One tick of growth and income for every spawned, living player
///
/// Every player is computed from the same snapshot, so the order the
/// updates are applied in does not matter.
pub fn plan_updates(world: &WorldModel, config: &Config) -> Result<Vec<GrowthUpdate>> {
    let players: Vec<&Player> = world.alive_players().filter(|p| p.spawned).collect();

    // PARALLEL: players only read their own ledger
    players
        .par_iter()
        .map(|p| {
            Ok(GrowthUpdate {
                player: p.id,
                troops: grow(p, 1, config)?,
                income: earn(p, 1, config)? - p.gold,
            })
        })
        .collect()
}

/// Write planned updates into the world
pub fn apply_updates(world: &mut WorldModel, updates: &[GrowthUpdate]) -> Result<()> {
    for update in updates {
        world.apply_growth(update.player, update.troops)?;
        world.credit_gold(update.player, update.income)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PlayerInfo, TileId};
    use crate::world::GameMap;

    #[test]
    fn test_unspawned_players_do_not_grow() {
        let mut world = WorldModel::new(GameMap::land(4, 4));
        let a = world.add_player(PlayerInfo::human("a"));
        let b = world.add_player(PlayerInfo::bot("b"));
        world.claim_spawn(a, TileId(5), 100, 0).unwrap();

        let config = Config::default();
        let updates = plan_updates(&world, &config).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].player, a);

        apply_updates(&mut world, &updates).unwrap();
        assert!(world.player(a).unwrap().troops > 100);
        assert!(world.player(a).unwrap().gold > 0);
        assert_eq!(world.player(b).unwrap().troops, 0);
    }
}
