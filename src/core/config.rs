//! Session configuration and balance policy
//!
//! The engine never hard-codes balance numbers. Every troop, gold and
//! capture formula is asked of a [`PlayerConfig`] implementation which is
//! injected once per session and treated as immutable afterwards.
//! [`TunedPlayerConfig`] is the data-driven default, loadable from TOML.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{Gold, PlayerInfo, PlayerType, Troops};
use crate::world::{Defender, Player, Tile, UnitKind};

/// Cost of contesting a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContestResult {
    pub attacker_troop_loss: Troops,
    pub defender_troop_loss: Troops,
    /// Share of the attack's per-tick tile budget this contest consumes
    pub tiles_per_tick_used: u32,
}

/// Balance policy consulted by every resolver
///
/// Implementations must be pure and deterministic: the same arguments always
/// produce the same answer on every replica, and no output is negative.
pub trait PlayerConfig: Send + Sync + fmt::Debug {
    fn start_troops(&self, info: &PlayerInfo) -> Troops;

    fn start_gold(&self, info: &PlayerInfo) -> Gold;

    /// Soft cap that growth never pushes a player past
    fn max_troops(&self, player: &Player) -> Troops;

    /// Troops gained by `player` in one tick
    fn troop_addition_rate(&self, player: &Player) -> Troops;

    fn gold_addition_rate(&self, player: &Player) -> Gold;

    /// Tile-capture budget of one attack step
    ///
    /// A wider frontier (more adjacent enemy tiles) allows faster expansion.
    fn attack_tiles_per_tick(
        &self,
        attacker: &Player,
        defender: Defender<'_>,
        num_adjacent_enemy_tiles: usize,
    ) -> u32;

    /// Losses on both sides for contesting `tile`
    fn attack_logic(&self, attacker: &Player, defender: Defender<'_>, tile: &Tile)
        -> ContestResult;

    /// Whether a player-held tile falls after its holder lost `defender_troop_loss`
    fn tile_defeated(&self, defender: &Player, defender_troop_loss: Troops) -> bool;

    /// Troops committed to a land attack when the intent does not name an amount
    fn attack_amount(&self, attacker: &Player, defender: Defender<'_>) -> Troops;

    /// Troops committed to a boat attack when the intent does not name an amount
    fn boat_attack_amount(&self, attacker: &Player, defender: Defender<'_>) -> Troops;

    fn unit_cost(&self, kind: UnitKind) -> Gold;

    /// Water tiles a boat crosses per tick
    fn boat_speed(&self) -> u32;

    /// Blast radius of a nuke, in adjacency steps
    fn nuke_radius(&self) -> u32;
}

/// Session-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Wall-clock length of one tick
    pub turn_interval_ms: u64,
    /// Milliseconds between public lobby creations
    pub game_creation_rate: u64,
    /// Milliseconds a lobby stays open
    pub lobby_lifetime: u64,
    /// Computer players added to a session
    pub num_bots: u16,
    /// Re-resolutions allowed for one attack whose outcome went stale within a tick
    pub max_stale_retries: u32,
    /// Seed for the bot RNG
    pub seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            turn_interval_ms: 100,
            game_creation_rate: 60_000,
            lobby_lifetime: 120_000,
            num_bots: 4,
            max_stale_retries: 3,
            seed: 12345,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.turn_interval_ms == 0 {
            return Err(EngineError::Config("turn_interval_ms must be positive".into()));
        }
        if self.max_stale_retries == 0 {
            return Err(EngineError::Config(
                "max_stale_retries must allow at least one retry".into(),
            ));
        }
        Ok(())
    }
}

/// Data-driven balance table
///
/// Percentages are whole numbers (`20` means 20%). All arithmetic is integer
/// so every replica rounds identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunedPlayerConfig {
    // === STARTING CONDITIONS ===
    pub start_troops_human: Troops,
    pub start_troops_bot: Troops,
    pub start_gold: Gold,

    // === TROOP ECONOMY ===
    /// Cap with zero tiles; each owned tile raises it by `max_troops_per_tile`
    pub max_troops_base: Troops,
    pub max_troops_per_tile: Troops,
    /// Flat troops added per tick before diminishing returns
    pub growth_base: Troops,
    /// Current troops divided by this are added per tick
    pub growth_divisor: Troops,
    /// Bots grow at this share of the human rate
    pub bot_growth_percent: u64,

    // === GOLD ECONOMY ===
    pub gold_base: Gold,
    pub gold_per_tile: Gold,

    // === ATTACKS ===
    /// Share of adjacent enemy tiles that can be taken per tick
    pub frontier_percent: u64,
    pub max_tiles_per_tick: u32,
    /// Fixed price of taking one unclaimed tile
    pub terra_nullius_cost: Troops,
    /// Flat price of contesting a player tile
    pub attack_base_cost: Troops,
    /// Attacker loss as a share of the defender's garrison
    pub attacker_loss_percent: u64,
    /// A player tile falls once the defender lost this share of its garrison on it
    pub defeat_threshold_percent: u64,
    /// Budget units consumed per contested shore tile (land uses 1)
    pub shore_tiles_per_tick_used: u32,
    pub attack_percent: u64,
    pub boat_attack_percent: u64,
    pub boat_speed: u32,

    // === UNITS ===
    pub port_cost: Gold,
    pub destroyer_cost: Gold,
    pub missile_silo_cost: Gold,
    pub nuke_cost: Gold,
    pub nuke_radius: u32,
}

impl Default for TunedPlayerConfig {
    fn default() -> Self {
        Self {
            start_troops_human: 1_000,
            start_troops_bot: 500,
            start_gold: 100,

            max_troops_base: 10_000,
            max_troops_per_tile: 1_000,
            growth_base: 10,
            growth_divisor: 25,
            bot_growth_percent: 60,

            gold_base: 10,
            gold_per_tile: 1,

            frontier_percent: 50,
            max_tiles_per_tick: 64,
            terra_nullius_cost: 1,
            attack_base_cost: 1,
            attacker_loss_percent: 60,
            defeat_threshold_percent: 50,
            shore_tiles_per_tick_used: 1,
            attack_percent: 20,
            boat_attack_percent: 30,
            boat_speed: 4,

            port_cost: 250,
            destroyer_cost: 500,
            missile_silo_cost: 1_000,
            nuke_cost: 2_000,
            nuke_radius: 2,
        }
    }
}

impl TunedPlayerConfig {
    pub fn validate(&self) -> Result<()> {
        let percents = [
            ("bot_growth_percent", self.bot_growth_percent),
            ("frontier_percent", self.frontier_percent),
            ("defeat_threshold_percent", self.defeat_threshold_percent),
            ("attack_percent", self.attack_percent),
            ("boat_attack_percent", self.boat_attack_percent),
        ];
        for (name, value) in percents {
            if value > 100 {
                return Err(EngineError::Config(format!(
                    "{} ({}) must be at most 100",
                    name, value
                )));
            }
        }
        if self.growth_divisor == 0 {
            return Err(EngineError::Config("growth_divisor must be positive".into()));
        }
        if self.boat_speed == 0 {
            return Err(EngineError::Config("boat_speed must be positive".into()));
        }
        if self.max_tiles_per_tick == 0 {
            return Err(EngineError::Config("max_tiles_per_tick must be positive".into()));
        }
        Ok(())
    }

    fn defender_troops(defender: Defender<'_>) -> Troops {
        match defender {
            Defender::TerraNullius => 0,
            Defender::Player(p) => p.troops,
        }
    }
}

impl PlayerConfig for TunedPlayerConfig {
    fn start_troops(&self, info: &PlayerInfo) -> Troops {
        match info.player_type {
            PlayerType::Human => self.start_troops_human,
            PlayerType::Bot => self.start_troops_bot,
        }
    }

    fn start_gold(&self, _info: &PlayerInfo) -> Gold {
        self.start_gold
    }

    fn max_troops(&self, player: &Player) -> Troops {
        self.max_troops_base + self.max_troops_per_tile * player.tile_count() as Troops
    }

    fn troop_addition_rate(&self, player: &Player) -> Troops {
        let max = self.max_troops(player);
        if max == 0 || player.troops >= max {
            return 0;
        }
        let raw = self.growth_base + player.troops / self.growth_divisor;
        // Diminishing returns as troops approach the cap
        let damped = raw * (max - player.troops) / max;
        match player.info.player_type {
            PlayerType::Human => damped,
            PlayerType::Bot => damped * self.bot_growth_percent / 100,
        }
    }

    fn gold_addition_rate(&self, player: &Player) -> Gold {
        self.gold_base + self.gold_per_tile * player.tile_count() as Gold
    }

    fn attack_tiles_per_tick(
        &self,
        attacker: &Player,
        defender: Defender<'_>,
        num_adjacent_enemy_tiles: usize,
    ) -> u32 {
        if num_adjacent_enemy_tiles == 0 {
            return 0;
        }
        let adjacent = num_adjacent_enemy_tiles as u64;
        let budget = match defender {
            Defender::TerraNullius => adjacent * self.frontier_percent / 100,
            Defender::Player(_) => {
                let total = (attacker.troops + Self::defender_troops(defender)).max(1);
                adjacent * self.frontier_percent * attacker.troops / (100 * total)
            }
        };
        budget.clamp(1, self.max_tiles_per_tick as u64) as u32
    }

    fn attack_logic(
        &self,
        attacker: &Player,
        defender: Defender<'_>,
        tile: &Tile,
    ) -> ContestResult {
        let tiles_per_tick_used = if tile.terrain.is_shore() {
            self.shore_tiles_per_tick_used.max(1)
        } else {
            1
        };
        match defender {
            Defender::TerraNullius => ContestResult {
                attacker_troop_loss: self.terra_nullius_cost,
                defender_troop_loss: 0,
                tiles_per_tick_used,
            },
            Defender::Player(def) => {
                let garrison = def.garrison();
                let total = (attacker.troops + def.troops).max(1);
                // An attacker at least as strong as the defender wipes out the garrison
                let defender_troop_loss = (garrison * 2 * attacker.troops / total).min(garrison);
                ContestResult {
                    attacker_troop_loss: self.attack_base_cost
                        + garrison * self.attacker_loss_percent / 100,
                    defender_troop_loss,
                    tiles_per_tick_used,
                }
            }
        }
    }

    fn tile_defeated(&self, defender: &Player, defender_troop_loss: Troops) -> bool {
        let garrison = defender.garrison();
        garrison == 0 || defender_troop_loss * 100 >= garrison * self.defeat_threshold_percent
    }

    fn attack_amount(&self, attacker: &Player, _defender: Defender<'_>) -> Troops {
        attacker.troops * self.attack_percent / 100
    }

    fn boat_attack_amount(&self, attacker: &Player, _defender: Defender<'_>) -> Troops {
        attacker.troops * self.boat_attack_percent / 100
    }

    fn unit_cost(&self, kind: UnitKind) -> Gold {
        match kind {
            UnitKind::Port => self.port_cost,
            UnitKind::Destroyer => self.destroyer_cost,
            UnitKind::MissileSilo => self.missile_silo_cost,
            UnitKind::Nuke => self.nuke_cost,
        }
    }

    fn boat_speed(&self) -> u32 {
        self.boat_speed
    }

    fn nuke_radius(&self) -> u32 {
        self.nuke_radius
    }
}

/// On-disk layout of a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct ConfigFile {
    session: SessionConfig,
    player: TunedPlayerConfig,
}

/// Immutable configuration bundle of one game session
#[derive(Clone)]
pub struct Config {
    pub session: SessionConfig,
    player: Arc<dyn PlayerConfig>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("session", &self.session)
            .field("player", &self.player)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(SessionConfig::default(), TunedPlayerConfig::default())
    }
}

impl Config {
    pub fn new(session: SessionConfig, player: impl PlayerConfig + 'static) -> Self {
        Self {
            session,
            player: Arc::new(player),
        }
    }

    /// Build a config around an already shared policy
    pub fn with_policy(session: SessionConfig, player: Arc<dyn PlayerConfig>) -> Self {
        Self { session, player }
    }

    /// The balance policy
    pub fn player(&self) -> &dyn PlayerConfig {
        self.player.as_ref()
    }

    pub fn turn_interval_ms(&self) -> u64 {
        self.session.turn_interval_ms
    }

    pub fn game_creation_rate(&self) -> u64 {
        self.session.game_creation_rate
    }

    pub fn lobby_lifetime(&self) -> u64 {
        self.session.lobby_lifetime
    }

    pub fn num_bots(&self) -> u16 {
        self.session.num_bots
    }

    /// Parse a TOML document with optional `[session]` and `[player]` tables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        file.session.validate()?;
        file.player.validate()?;
        Ok(Self::new(file.session, file.player))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PlayerId, TileId};
    use crate::world::TerrainKind;
    use std::collections::BTreeSet;

    fn player(id: u16, troops: Troops, tiles: u32) -> Player {
        let mut p = Player::new(PlayerId(id), PlayerInfo::human(format!("p{}", id)));
        p.troops = troops;
        p.tiles = (0..tiles).map(TileId).collect::<BTreeSet<_>>();
        p
    }

    fn land(id: u32) -> Tile {
        Tile {
            id: TileId(id),
            terrain: TerrainKind::Land,
            owner: crate::core::types::Owner::TerraNullius,
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(SessionConfig::default().validate().is_ok());
        assert!(TunedPlayerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_percent_over_hundred() {
        let tuned = TunedPlayerConfig {
            attack_percent: 150,
            ..Default::default()
        };
        assert!(matches!(tuned.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_from_toml_overrides_only_named_fields() {
        let config = Config::from_toml_str(
            r#"
            [session]
            turn_interval_ms = 250
            num_bots = 2

            [player]
            terra_nullius_cost = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.turn_interval_ms(), 250);
        assert_eq!(config.num_bots(), 2);
        assert_eq!(config.lobby_lifetime(), 120_000);

        let attacker = player(1, 100, 1);
        let result = config
            .player()
            .attack_logic(&attacker, Defender::TerraNullius, &land(5));
        assert_eq!(result.attacker_troop_loss, 3);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = Config::from_toml_str("[session]\nturn_interval_ms = 0").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
        let err = Config::from_toml_str("[session\n").unwrap_err();
        assert!(matches!(err, EngineError::TomlError(_)));
    }

    #[test]
    fn test_growth_stops_at_cap() {
        let tuned = TunedPlayerConfig::default();
        let capped = player(1, tuned.max_troops_base + tuned.max_troops_per_tile, 1);
        assert_eq!(tuned.troop_addition_rate(&capped), 0);
        let fresh = player(1, 100, 1);
        assert!(tuned.troop_addition_rate(&fresh) > 0);
    }

    #[test]
    fn test_bots_grow_slower() {
        let tuned = TunedPlayerConfig::default();
        let human = player(1, 1_000, 4);
        let mut bot = human.clone();
        bot.info.player_type = PlayerType::Bot;
        assert!(tuned.troop_addition_rate(&bot) < tuned.troop_addition_rate(&human));
    }

    #[test]
    fn test_terra_nullius_never_loses_troops() {
        let tuned = TunedPlayerConfig::default();
        let attacker = player(1, 10_000, 3);
        let result = tuned.attack_logic(&attacker, Defender::TerraNullius, &land(9));
        assert_eq!(result.defender_troop_loss, 0);
        assert_eq!(result.attacker_troop_loss, tuned.terra_nullius_cost);
    }

    #[test]
    fn test_wider_frontier_allows_more_tiles() {
        let tuned = TunedPlayerConfig::default();
        let attacker = player(1, 1_000, 3);
        let narrow = tuned.attack_tiles_per_tick(&attacker, Defender::TerraNullius, 2);
        let wide = tuned.attack_tiles_per_tick(&attacker, Defender::TerraNullius, 20);
        assert!(wide > narrow);
        assert_eq!(
            tuned.attack_tiles_per_tick(&attacker, Defender::TerraNullius, 0),
            0
        );
    }

    #[test]
    fn test_strong_attacker_defeats_tile() {
        let tuned = TunedPlayerConfig::default();
        let attacker = player(1, 20, 1);
        let defender = player(2, 15, 1);
        let result = tuned.attack_logic(&attacker, Defender::Player(&defender), &land(1));
        assert_eq!(result.defender_troop_loss, 15);
        assert!(tuned.tile_defeated(&defender, result.defender_troop_loss));
    }

    #[test]
    fn test_weak_attacker_does_not_defeat_tile() {
        let tuned = TunedPlayerConfig::default();
        let attacker = player(1, 10, 1);
        let defender = player(2, 1_000, 1);
        let result = tuned.attack_logic(&attacker, Defender::Player(&defender), &land(1));
        assert!(!tuned.tile_defeated(&defender, result.defender_troop_loss));
    }
}
