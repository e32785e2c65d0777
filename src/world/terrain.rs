//! Terrain and tile views

use serde::{Deserialize, Serialize};

use crate::core::types::{Owner, TileId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    Land,
    /// Land bordering at least one water tile
    Shore,
    Water,
}

impl TerrainKind {
    /// Land and shore can be owned; water never can
    pub fn is_capturable(self) -> bool {
        !matches!(self, TerrainKind::Water)
    }

    pub fn is_shore(self) -> bool {
        matches!(self, TerrainKind::Shore)
    }

    pub fn is_water(self) -> bool {
        matches!(self, TerrainKind::Water)
    }
}

/// Read-only view of one grid cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub terrain: TerrainKind,
    pub owner: Owner,
}
