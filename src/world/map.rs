//! GameMap - immutable terrain grid with precomputed adjacency
//!
//! Maps are loaded from a plain text layout, one character per tile:
//!
//! ```text
//! ....~~~
//! ....~~.
//! ```
//!
//! `.` or `#` is land, `~` is water. Shore tiles are derived: any land tile
//! with a water neighbour.

use std::collections::{BTreeSet, VecDeque};
use std::path::Path;

use crate::core::error::{EngineError, Result};
use crate::core::types::TileId;
use crate::world::terrain::TerrainKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMap {
    width: u32,
    height: u32,
    terrain: Vec<TerrainKind>,
    neighbors: Vec<Vec<TileId>>,
}

impl GameMap {
    /// Build a map from a water mask; `true` marks water
    pub fn from_water_mask(width: u32, height: u32, water: &[bool]) -> Result<Self> {
        let expected = width as usize * height as usize;
        if water.len() != expected {
            return Err(EngineError::Map(format!(
                "expected {} cells for {}x{}, got {}",
                expected,
                width,
                height,
                water.len()
            )));
        }
        Ok(Self::build(width, height, water))
    }

    /// An all-land map
    pub fn land(width: u32, height: u32) -> Self {
        let cells = vec![false; width as usize * height as usize];
        Self::build(width, height, &cells)
    }

    fn build(width: u32, height: u32, water: &[bool]) -> Self {
        let expected = water.len();
        let neighbors: Vec<Vec<TileId>> = (0..expected)
            .map(|i| grid_neighbors(width, height, i as u32))
            .collect();

        let terrain = (0..expected)
            .map(|i| {
                if water[i] {
                    TerrainKind::Water
                } else if neighbors[i].iter().any(|n| water[n.index()]) {
                    TerrainKind::Shore
                } else {
                    TerrainKind::Land
                }
            })
            .collect();

        Self {
            width,
            height,
            terrain,
            neighbors,
        }
    }

    /// Parse a text layout
    pub fn parse(layout: &str) -> Result<Self> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(EngineError::Map("layout is empty".into()));
        }

        let mut water = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(EngineError::Map(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }
            for (x, c) in row.chars().enumerate() {
                match c {
                    '.' | '#' => water.push(false),
                    '~' => water.push(true),
                    other => {
                        return Err(EngineError::Map(format!(
                            "unknown terrain '{}' at ({}, {})",
                            other, x, y
                        )))
                    }
                }
            }
        }

        Self::from_water_mask(width as u32, height as u32, &water)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.terrain.len()
    }

    pub fn contains(&self, tile: TileId) -> bool {
        tile.index() < self.terrain.len()
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<TileId> {
        (x < self.width && y < self.height).then(|| TileId(y * self.width + x))
    }

    pub fn coords(&self, tile: TileId) -> (u32, u32) {
        (tile.0 % self.width, tile.0 / self.width)
    }

    pub fn terrain(&self, tile: TileId) -> Option<TerrainKind> {
        self.terrain.get(tile.index()).copied()
    }

    pub fn neighbors(&self, tile: TileId) -> &[TileId] {
        self.neighbors
            .get(tile.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        (0..self.terrain.len() as u32).map(TileId)
    }

    /// Tiles within `radius` adjacency steps of `center`, including it
    pub fn within_radius(&self, center: TileId, radius: u32) -> BTreeSet<TileId> {
        let mut seen = BTreeSet::new();
        if !self.contains(center) {
            return seen;
        }
        let mut queue = VecDeque::from([(center, 0u32)]);
        seen.insert(center);
        while let Some((tile, depth)) = queue.pop_front() {
            if depth == radius {
                continue;
            }
            for &next in self.neighbors(tile) {
                if seen.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }
        seen
    }

    /// Length of the shortest water path between two shore tiles
    ///
    /// The path starts on a water tile next to one of `origins` and must end
    /// on a water tile next to `landing`. Returns the number of water tiles
    /// crossed, or `None` when no such path exists.
    pub fn sea_distance(&self, origins: &BTreeSet<TileId>, landing: TileId) -> Option<u32> {
        let targets: BTreeSet<TileId> = self
            .neighbors(landing)
            .iter()
            .copied()
            .filter(|&n| self.terrain(n) == Some(TerrainKind::Water))
            .collect();
        if targets.is_empty() {
            return None;
        }

        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        for &origin in origins {
            if self.terrain(origin) != Some(TerrainKind::Shore) {
                continue;
            }
            for &water in self.neighbors(origin) {
                if self.terrain(water) == Some(TerrainKind::Water) && seen.insert(water) {
                    queue.push_back((water, 1u32));
                }
            }
        }

        while let Some((tile, dist)) = queue.pop_front() {
            if targets.contains(&tile) {
                return Some(dist);
            }
            for &next in self.neighbors(tile) {
                if self.terrain(next) == Some(TerrainKind::Water) && seen.insert(next) {
                    queue.push_back((next, dist + 1));
                }
            }
        }
        None
    }
}

/// 4-neighbourhood in ascending id order
fn grid_neighbors(width: u32, height: u32, index: u32) -> Vec<TileId> {
    let x = index % width;
    let y = index / width;
    let mut out = Vec::with_capacity(4);
    if y > 0 {
        out.push(TileId(index - width));
    }
    if x > 0 {
        out.push(TileId(index - 1));
    }
    if x + 1 < width {
        out.push(TileId(index + 1));
    }
    if y + 1 < height {
        out.push(TileId(index + width));
    }
    out
}
