//! WorldModel - the ownership map and player ledger of one game session
//!
//! Tile ownership changes only through [`WorldModel::transfer`]. Troop and
//! gold ledgers have their own narrow primitives used by the scheduler at
//! admission and growth time. Resolvers receive `&WorldModel` and cannot
//! mutate anything.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::AHashMap;

use crate::core::error::{EngineError, Rejection, Result};
use crate::core::types::{Gold, Owner, PlayerId, PlayerInfo, TileId, Troops, UnitId};
use crate::world::map::GameMap;
use crate::world::player::{Defender, Player};
use crate::world::snapshot::{PlayerSummary, WorldSnapshot};
use crate::world::terrain::{TerrainKind, Tile};
use crate::world::unit::{Unit, UnitKind};

/// One ownership change with the troop deltas that go with it
///
/// `to == from` records a contest the holder survived: only the troop deltas
/// are applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub tile: TileId,
    pub from: Owner,
    pub to: Owner,
    /// Player whose ledger `attacker_delta` applies to
    pub attacker: Option<PlayerId>,
    pub attacker_delta: i64,
    pub defender_delta: i64,
}

impl Transfer {
    /// A plain ownership change without troop deltas
    pub fn ownership(tile: TileId, from: Owner, to: Owner) -> Self {
        Self {
            tile,
            from,
            to,
            attacker: to.player(),
            attacker_delta: 0,
            defender_delta: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorldModel {
    map: Arc<GameMap>,
    owners: Vec<Owner>,
    players: BTreeMap<PlayerId, Player>,
    units: BTreeMap<UnitId, Unit>,
    /// Lookup only; never iterated
    units_by_tile: AHashMap<TileId, Vec<UnitId>>,
    next_player_id: u16,
    next_unit_id: u32,
    revision: u64,
}

impl WorldModel {
    pub fn new(map: GameMap) -> Self {
        Self::with_shared_map(Arc::new(map))
    }

    pub fn with_shared_map(map: Arc<GameMap>) -> Self {
        let owners = vec![Owner::TerraNullius; map.tile_count()];
        Self {
            map,
            owners,
            players: BTreeMap::new(),
            units: BTreeMap::new(),
            units_by_tile: AHashMap::new(),
            next_player_id: 1,
            next_unit_id: 1,
            revision: 0,
        }
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    /// Number of mutations applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // === TILES ===

    pub fn tile(&self, id: TileId) -> Option<Tile> {
        let terrain = self.map.terrain(id)?;
        Some(Tile {
            id,
            terrain,
            owner: self.owners[id.index()],
        })
    }

    pub fn owner(&self, id: TileId) -> Option<Owner> {
        self.owners.get(id.index()).copied()
    }

    pub fn terrain(&self, id: TileId) -> Option<TerrainKind> {
        self.map.terrain(id)
    }

    pub fn neighbors(&self, id: TileId) -> &[TileId] {
        self.map.neighbors(id)
    }

    /// Whether any neighbour of `tile` belongs to `player`
    pub fn borders(&self, player: PlayerId, tile: TileId) -> bool {
        self.neighbors(tile)
            .iter()
            .any(|&n| self.owner(n) == Some(Owner::Player(player)))
    }

    /// Capturable `defender` tiles adjacent to `attacker` territory
    pub fn frontier(&self, attacker: PlayerId, defender: Owner) -> BTreeSet<TileId> {
        let Some(player) = self.players.get(&attacker) else {
            return BTreeSet::new();
        };
        player
            .tiles
            .iter()
            .flat_map(|&t| self.neighbors(t).iter().copied())
            .filter(|&n| self.owner(n) == Some(defender) && self.is_capturable(n))
            .collect()
    }

    pub fn is_capturable(&self, tile: TileId) -> bool {
        self.terrain(tile).is_some_and(TerrainKind::is_capturable)
    }

    pub fn owned_shore(&self, player: PlayerId) -> BTreeSet<TileId> {
        self.players
            .get(&player)
            .map(|p| {
                p.tiles
                    .iter()
                    .copied()
                    .filter(|&t| self.terrain(t) == Some(TerrainKind::Shore))
                    .collect()
            })
            .unwrap_or_default()
    }

    // === PLAYERS ===

    /// Register a player; it owns nothing until it spawns
    pub fn add_player(&mut self, info: PlayerInfo) -> PlayerId {
        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        self.players.insert(id, Player::new(id, info));
        self.revision += 1;
        id
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.alive)
    }

    /// Resolve an owner into the argument resolvers hand to the balance policy
    pub fn defender(&self, owner: Owner) -> Result<Defender<'_>> {
        match owner {
            Owner::TerraNullius => Ok(Defender::TerraNullius),
            Owner::Player(id) => self
                .players
                .get(&id)
                .map(Defender::Player)
                .ok_or(EngineError::UnknownPlayer(id)),
        }
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .get_mut(&id)
            .ok_or(EngineError::UnknownPlayer(id))
    }

    /// Claim a starting position: `tile` plus its unowned land neighbours
    pub fn claim_spawn(
        &mut self,
        player: PlayerId,
        tile: TileId,
        troops: Troops,
        gold: Gold,
    ) -> std::result::Result<Vec<TileId>, Rejection> {
        let p = self
            .players
            .get(&player)
            .ok_or(Rejection::UnknownPlayer(player))?;
        if p.spawned {
            return Err(Rejection::AlreadySpawned(player));
        }
        if !p.alive {
            return Err(Rejection::PlayerNotAlive(player));
        }
        if !self.is_capturable(tile) || self.owner(tile) != Some(Owner::TerraNullius) {
            return Err(Rejection::NotClaimable(tile));
        }

        let mut claimed = vec![tile];
        claimed.extend(self.neighbors(tile).iter().copied().filter(|&n| {
            self.is_capturable(n) && self.owner(n) == Some(Owner::TerraNullius)
        }));

        for &t in &claimed {
            self.owners[t.index()] = Owner::Player(player);
        }
        if let Some(p) = self.players.get_mut(&player) {
            p.tiles.extend(claimed.iter().copied());
            p.troops = troops;
            p.gold = gold;
            p.spawned = true;
        }
        self.revision += 1;
        Ok(claimed)
    }

    /// Move troops out of a player's ledger into an attack
    pub fn commit_troops(
        &mut self,
        player: PlayerId,
        amount: Troops,
    ) -> std::result::Result<(), Rejection> {
        if amount == 0 {
            return Err(Rejection::EmptyCommitment);
        }
        let p = self
            .players
            .get_mut(&player)
            .ok_or(Rejection::UnknownPlayer(player))?;
        if !p.alive {
            return Err(Rejection::PlayerNotAlive(player));
        }
        if p.troops < amount {
            return Err(Rejection::InsufficientTroops {
                player,
                available: p.troops,
                required: amount,
            });
        }
        p.troops -= amount;
        self.revision += 1;
        Ok(())
    }

    /// Return troops an attack did not spend
    pub fn refund_troops(&mut self, player: PlayerId, amount: Troops) -> Result<()> {
        let p = self.player_mut(player)?;
        p.troops += amount;
        self.revision += 1;
        Ok(())
    }

    /// Write the economy resolver's result into the ledger
    pub fn apply_growth(&mut self, player: PlayerId, troops: Troops) -> Result<()> {
        let p = self.player_mut(player)?;
        p.troops = troops;
        self.revision += 1;
        Ok(())
    }

    pub fn credit_gold(&mut self, player: PlayerId, gold: Gold) -> Result<()> {
        let p = self.player_mut(player)?;
        p.gold += gold;
        self.revision += 1;
        Ok(())
    }

    pub fn spend_gold(
        &mut self,
        player: PlayerId,
        amount: Gold,
    ) -> std::result::Result<(), Rejection> {
        let p = self
            .players
            .get_mut(&player)
            .ok_or(Rejection::UnknownPlayer(player))?;
        if p.gold < amount {
            return Err(Rejection::InsufficientGold {
                player,
                available: p.gold,
                required: amount,
            });
        }
        p.gold -= amount;
        self.revision += 1;
        Ok(())
    }

    /// Mark a player that owns nothing as eliminated
    pub fn eliminate(&mut self, player: PlayerId) -> Result<()> {
        let p = self.player_mut(player)?;
        p.alive = false;
        p.troops = 0;
        self.revision += 1;
        Ok(())
    }

    // === OWNERSHIP ===

    /// Atomically change a tile's owner and apply the troop deltas
    ///
    /// Fails with `InvalidTransfer` when the tile is no longer held by
    /// `transfer.from`. Nothing is mutated on failure. Troop ledgers
    /// saturate at zero.
    pub fn transfer(&mut self, transfer: Transfer) -> Result<()> {
        let Transfer {
            tile,
            from,
            to,
            attacker,
            attacker_delta,
            defender_delta,
        } = transfer;

        let actual = self.owner(tile).ok_or(EngineError::UnknownTile(tile))?;
        if actual != from {
            return Err(EngineError::InvalidTransfer {
                tile,
                expected: from,
                actual,
            });
        }
        if to != from && to.player().is_some() && !self.is_capturable(tile) {
            return Err(EngineError::Map(format!("{} is water and cannot be owned", tile)));
        }
        for id in [from.player(), to.player(), attacker].into_iter().flatten() {
            if !self.players.contains_key(&id) {
                return Err(EngineError::UnknownPlayer(id));
            }
        }

        if let Some(id) = attacker {
            apply_delta(self.player_mut(id)?, attacker_delta);
        }
        if let Some(id) = from.player() {
            apply_delta(self.player_mut(id)?, defender_delta);
        }

        if to != from {
            if let Some(id) = from.player() {
                self.player_mut(id)?.tiles.remove(&tile);
            }
            if let Some(id) = to.player() {
                self.player_mut(id)?.tiles.insert(tile);
            }
            self.owners[tile.index()] = to;
            self.reassign_units(tile, to);
        }

        self.revision += 1;
        Ok(())
    }

    // === UNITS ===

    pub fn add_unit(&mut self, kind: UnitKind, owner: PlayerId, tile: TileId) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(
            id,
            Unit {
                id,
                kind,
                owner,
                tile,
            },
        );
        self.units_by_tile.entry(tile).or_default().push(id);
        self.revision += 1;
        id
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn units_on(&self, tile: TileId) -> impl Iterator<Item = &Unit> {
        self.units_by_tile
            .get(&tile)
            .into_iter()
            .flatten()
            .filter_map(|id| self.units.get(id))
    }

    pub fn units_of(&self, player: PlayerId, kind: UnitKind) -> impl Iterator<Item = &Unit> {
        self.units
            .values()
            .filter(move |u| u.owner == player && u.kind == kind)
    }

    /// Remove every unit standing on `tile`
    pub fn destroy_units_on(&mut self, tile: TileId) -> Vec<UnitId> {
        let removed = self.units_by_tile.remove(&tile).unwrap_or_default();
        for id in &removed {
            self.units.remove(id);
        }
        if !removed.is_empty() {
            self.revision += 1;
        }
        removed
    }

    fn reassign_units(&mut self, tile: TileId, to: Owner) {
        match to {
            Owner::Player(new_owner) => {
                if let Some(ids) = self.units_by_tile.get(&tile) {
                    for id in ids {
                        if let Some(unit) = self.units.get_mut(id) {
                            unit.owner = new_owner;
                        }
                    }
                }
            }
            Owner::TerraNullius => {
                self.destroy_units_on(tile);
            }
        }
    }

    // === SNAPSHOTS ===

    /// Troop and gold ledger in player id order
    pub fn summaries(&self) -> Vec<PlayerSummary> {
        self.players
            .values()
            .map(|p| PlayerSummary {
                id: p.id,
                name: p.info.name.clone(),
                troops: p.troops,
                gold: p.gold,
                tiles: p.tile_count(),
                alive: p.alive,
            })
            .collect()
    }

    pub fn snapshot(&self, tick: u64) -> WorldSnapshot {
        WorldSnapshot {
            tick,
            owners: self.owners.clone(),
            players: self.summaries(),
            units: self.units.values().cloned().collect(),
        }
    }
}

fn apply_delta(player: &mut Player, delta: i64) {
    if delta >= 0 {
        player.troops += delta as Troops;
    } else {
        player.troops = player.troops.saturating_sub(delta.unsigned_abs());
    }
}
