pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, ContestResult, PlayerConfig, SessionConfig, TunedPlayerConfig};
pub use error::{EngineError, Rejection, Result};
pub use types::{
    AttackId, Gold, Owner, PlayerId, PlayerInfo, PlayerType, Tick, TileId, Troops, UnitId,
};
