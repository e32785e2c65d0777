//! World model: terrain grid, ownership map, player ledger and units

pub mod map;
pub mod model;
pub mod player;
pub mod snapshot;
pub mod terrain;
pub mod unit;

pub use map::GameMap;
pub use model::{Transfer, WorldModel};
pub use player::{Defender, Player};
pub use snapshot::{PlayerSummary, WorldSnapshot};
pub use terrain::{TerrainKind, Tile};
pub use unit::{Unit, UnitKind};
