//! BotDriver - turns world state into intents for computer players

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::bots::targets::{find_expansion_targets, spawn_candidates};
use crate::combat::{sea_route, AttackBook};
use crate::core::config::Config;
use crate::core::types::{Owner, PlayerId, TileId};
use crate::intent::Intent;
use crate::world::{Player, TerrainKind, UnitKind, WorldModel};

/// Chance per tick that an idle bot starts something, in percent
const ACTION_PERCENT: u32 = 35;
/// Chance that a bot without land targets looks across the sea, in percent
const BOAT_PERCENT: u32 = 10;

/// Deterministic bot brain: the same seed and world always yield the same intents
#[derive(Debug, Clone)]
pub struct BotDriver {
    rng: ChaCha8Rng,
    bots: Vec<PlayerId>,
}

impl BotDriver {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            bots: Vec::new(),
        }
    }

    pub fn register(&mut self, player: PlayerId) {
        if !self.bots.contains(&player) {
            self.bots.push(player);
        }
    }

    pub fn bots(&self) -> &[PlayerId] {
        &self.bots
    }

    /// Intents for every bot for the coming tick
    pub fn plan(&mut self, world: &WorldModel, attacks: &AttackBook, config: &Config) -> Vec<Intent> {
        let mut intents = Vec::new();
        let mut reserved: Vec<TileId> = Vec::new();

        for i in 0..self.bots.len() {
            let id = self.bots[i];
            let Some(bot) = world.player(id) else {
                continue;
            };
            if !bot.alive {
                continue;
            }

            if !bot.spawned {
                let candidates: Vec<TileId> = spawn_candidates(world)
                    .into_iter()
                    .filter(|t| !reserved.iter().any(|r| world.neighbors(*r).contains(t) || r == t))
                    .collect();
                if let Some(&tile) = candidates.choose(&mut self.rng) {
                    reserved.push(tile);
                    intents.push(Intent::Spawn { player: id, tile });
                }
                continue;
            }

            if self.rng.gen_range(0..100) >= ACTION_PERCENT {
                continue;
            }
            if let Some(intent) = self.build_or_nuke(bot, world, config) {
                intents.push(intent);
                continue;
            }
            if let Some(intent) = self.attack(bot, world, attacks) {
                intents.push(intent);
            }
        }

        trace!(count = intents.len(), "bot intents planned");
        intents
    }

    fn build_or_nuke(&mut self, bot: &Player, world: &WorldModel, config: &Config) -> Option<Intent> {
        let policy = config.player();
        let has_silo = world.units_of(bot.id, UnitKind::MissileSilo).next().is_some();

        if has_silo && bot.gold >= policy.unit_cost(UnitKind::Nuke) {
            let targets = find_expansion_targets(bot.id, world);
            let (tile, _) = targets.weak_neighbors.first().copied().or_else(|| {
                world
                    .alive_players()
                    .filter(|p| p.id != bot.id)
                    .max_by_key(|p| (p.tile_count(), p.id))
                    .and_then(|p| p.tiles.iter().next().map(|&t| (t, p.id)))
            })?;
            return Some(Intent::SendNuke {
                player: bot.id,
                target: tile,
            });
        }

        if !has_silo && bot.gold >= policy.unit_cost(UnitKind::MissileSilo) {
            let tile = *bot.tiles.iter().next()?;
            return Some(Intent::BuildUnit {
                player: bot.id,
                unit: UnitKind::MissileSilo,
                tile,
            });
        }

        let has_port = world.units_of(bot.id, UnitKind::Port).next().is_some();
        if !has_port && bot.gold >= policy.unit_cost(UnitKind::Port) {
            let shore = world.owned_shore(bot.id);
            let tile = *shore.iter().next()?;
            return Some(Intent::BuildUnit {
                player: bot.id,
                unit: UnitKind::Port,
                tile,
            });
        }
        None
    }

    fn attack(&mut self, bot: &Player, world: &WorldModel, attacks: &AttackBook) -> Option<Intent> {
        let targets = find_expansion_targets(bot.id, world);

        if let Some(&tile) = targets.unclaimed.first() {
            if attacks.land_attack_between(bot.id, Owner::TerraNullius).is_none() {
                return Some(Intent::LandAttack {
                    player: bot.id,
                    target: tile,
                    troops: None,
                });
            }
        }
        if let Some(&(tile, _)) = targets.weak_neighbors.first() {
            return Some(Intent::LandAttack {
                player: bot.id,
                target: tile,
                troops: None,
            });
        }

        if targets.unclaimed.is_empty() && self.rng.gen_range(0..100) < BOAT_PERCENT {
            let beaches: Vec<TileId> = world
                .map()
                .tiles()
                .filter(|&t| world.terrain(t) == Some(TerrainKind::Shore))
                .filter(|&t| world.owner(t) != Some(Owner::Player(bot.id)))
                .collect();
            let &target = beaches.choose(&mut self.rng)?;
            sea_route(world, bot.id, target)?;
            return Some(Intent::BoatAttack {
                player: bot.id,
                target,
                troops: None,
            });
        }
        None
    }
}
