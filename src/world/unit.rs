//! Buildable units

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, TileId, UnitId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Built on an owned shore tile
    Port,
    /// Requires a port; stationed on it
    Destroyer,
    /// Required to launch nukes
    MissileSilo,
    /// Consumed on launch, never stationed
    Nuke,
}

impl UnitKind {
    pub fn name(self) -> &'static str {
        match self {
            UnitKind::Port => "port",
            UnitKind::Destroyer => "destroyer",
            UnitKind::MissileSilo => "missile silo",
            UnitKind::Nuke => "nuke",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub owner: PlayerId,
    pub tile: TileId,
}
