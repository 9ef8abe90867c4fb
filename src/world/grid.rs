//! Grid terrain and occupancy
//!
//! The grid is the single owner of all occupancy information. Agents and
//! missiles are referenced from cells by opaque id; every occupancy change
//! goes through `Grid` methods so no two components ever hold aliased
//! occupant lists.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::types::{AgentId, MissileId, Position};

/// Terrain tag carried by every cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terrain {
    Open,
    Wall,
    /// Restores energy to a tank resting on it, every turn
    EnergyRecharge,
    /// Restores health to a tank resting on it, every turn
    HealthRecharge,
}

/// One tile of an already-parsed map
///
/// This is the engine's input format: the external map loader hands over a
/// rectangular `Vec<Vec<MapTile>>`. `Ammo` marks an open cell holding an
/// initial ammunition bucket (buckets are occupants, not terrain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapTile {
    Open,
    Wall,
    Energy,
    Health,
    Ammo,
}

/// Something sitting on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupant {
    Agent(AgentId),
    Missile(MissileId),
    AmmoBucket,
}

/// One grid cell: terrain plus an unordered occupant list
#[derive(Debug, Clone)]
struct Cell {
    terrain: Terrain,
    occupants: Vec<Occupant>,
}

/// Fixed-size 2D world with bordering walls
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from parsed map tiles
    ///
    /// Validates that the map is rectangular, at least 3x3, fully walled at
    /// the border, and has at least one enterable interior cell. `Ammo`
    /// tiles become open terrain with a bucket occupant already in place.
    pub fn from_tiles(tiles: &[Vec<MapTile>]) -> Result<Self> {
        let height = tiles.len();
        let width = tiles.first().map_or(0, |row| row.len());

        if width < 3 || height < 3 {
            return Err(EngineError::MapTooSmall { width, height });
        }
        if tiles.iter().any(|row| row.len() != width) {
            return Err(EngineError::MapNotRectangular);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                if border && *tile != MapTile::Wall {
                    return Err(EngineError::BorderNotWall(Position::new(x, y)));
                }

                let (terrain, occupants) = match tile {
                    MapTile::Open => (Terrain::Open, Vec::new()),
                    MapTile::Wall => (Terrain::Wall, Vec::new()),
                    MapTile::Energy => (Terrain::EnergyRecharge, Vec::new()),
                    MapTile::Health => (Terrain::HealthRecharge, Vec::new()),
                    MapTile::Ammo => (Terrain::Open, vec![Occupant::AmmoBucket]),
                };
                cells.push(Cell { terrain, occupants });
            }
        }

        let grid = Self {
            width,
            height,
            cells,
        };
        if !grid.interior().any(|pos| grid.is_enterable(pos)) {
            return Err(EngineError::NoOpenCells);
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, pos: Position) -> usize {
        debug_assert!(pos.x < self.width && pos.y < self.height);
        pos.y * self.width + pos.x
    }

    /// Iterator over all interior (non-border) positions, row-major
    pub fn interior(&self) -> impl Iterator<Item = Position> + '_ {
        let (w, h) = (self.width, self.height);
        (1..h - 1).flat_map(move |y| (1..w - 1).map(move |x| Position::new(x, y)))
    }

    pub fn terrain_at(&self, pos: Position) -> Terrain {
        self.cells[self.index(pos)].terrain
    }

    pub fn occupants_at(&self, pos: Position) -> &[Occupant] {
        &self.cells[self.index(pos)].occupants
    }

    /// True iff the terrain at `pos` is not a wall
    pub fn is_enterable(&self, pos: Position) -> bool {
        self.terrain_at(pos) != Terrain::Wall
    }

    /// The number of live ammunition buckets currently on the grid
    pub fn bucket_count(&self) -> u32 {
        self.cells
            .iter()
            .flat_map(|cell| cell.occupants.iter())
            .filter(|occ| **occ == Occupant::AmmoBucket)
            .count() as u32
    }

    /// Agent occupants of `pos`, in the order they were added
    pub fn agents_at(&self, pos: Position) -> impl Iterator<Item = AgentId> + '_ {
        self.occupants_at(pos).iter().filter_map(|occ| match occ {
            Occupant::Agent(id) => Some(*id),
            _ => None,
        })
    }

    pub fn add_occupant(&mut self, pos: Position, occupant: Occupant) {
        debug_assert!(self.is_enterable(pos), "occupant placed on a wall");
        let index = self.index(pos);
        self.cells[index].occupants.push(occupant);
    }

    /// Remove one matching occupant; returns false if none was present
    pub fn remove_occupant(&mut self, pos: Position, occupant: Occupant) -> bool {
        let index = self.index(pos);
        let occupants = &mut self.cells[index].occupants;
        match occupants.iter().position(|occ| *occ == occupant) {
            Some(slot) => {
                occupants.swap_remove(slot);
                true
            }
            None => false,
        }
    }

    /// Atomically relocate an occupant between cells
    pub fn move_occupant(&mut self, from: Position, to: Position, occupant: Occupant) {
        let removed = self.remove_occupant(from, occupant);
        debug_assert!(removed, "moved an occupant that was not at `from`");
        self.add_occupant(to, occupant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map(width: usize, height: usize) -> Vec<Vec<MapTile>> {
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                            MapTile::Wall
                        } else {
                            MapTile::Open
                        }
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_valid_map_loads() {
        let grid = Grid::from_tiles(&open_map(8, 6)).unwrap();
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 6);
        assert_eq!(grid.terrain_at(Position::new(0, 0)), Terrain::Wall);
        assert_eq!(grid.terrain_at(Position::new(3, 3)), Terrain::Open);
        assert!(grid.is_enterable(Position::new(1, 1)));
        assert!(!grid.is_enterable(Position::new(0, 3)));
    }

    #[test]
    fn test_rejects_ragged_map() {
        let mut tiles = open_map(6, 6);
        tiles[2].pop();
        assert_eq!(
            Grid::from_tiles(&tiles).err(),
            Some(EngineError::MapNotRectangular)
        );
    }

    #[test]
    fn test_rejects_tiny_map() {
        let tiles = open_map(2, 5);
        assert!(matches!(
            Grid::from_tiles(&tiles),
            Err(EngineError::MapTooSmall { .. })
        ));
    }

    #[test]
    fn test_rejects_open_border() {
        let mut tiles = open_map(6, 6);
        tiles[0][2] = MapTile::Open;
        assert_eq!(
            Grid::from_tiles(&tiles).err(),
            Some(EngineError::BorderNotWall(Position::new(2, 0)))
        );
    }

    #[test]
    fn test_rejects_all_wall_interior() {
        let tiles = vec![vec![MapTile::Wall; 4]; 4];
        assert_eq!(Grid::from_tiles(&tiles).err(), Some(EngineError::NoOpenCells));
    }

    #[test]
    fn test_ammo_tile_becomes_bucket() {
        let mut tiles = open_map(6, 6);
        tiles[2][3] = MapTile::Ammo;
        let grid = Grid::from_tiles(&tiles).unwrap();

        assert_eq!(grid.terrain_at(Position::new(3, 2)), Terrain::Open);
        assert_eq!(
            grid.occupants_at(Position::new(3, 2)),
            &[Occupant::AmmoBucket]
        );
        assert_eq!(grid.bucket_count(), 1);
    }

    #[test]
    fn test_occupant_add_remove_move() {
        let mut grid = Grid::from_tiles(&open_map(6, 6)).unwrap();
        let a = Position::new(1, 1);
        let b = Position::new(2, 1);
        let occ = Occupant::Agent(AgentId(0));

        grid.add_occupant(a, occ);
        assert_eq!(grid.occupants_at(a), &[occ]);

        grid.move_occupant(a, b, occ);
        assert!(grid.occupants_at(a).is_empty());
        assert_eq!(grid.agents_at(b).collect::<Vec<_>>(), vec![AgentId(0)]);

        assert!(grid.remove_occupant(b, occ));
        assert!(!grid.remove_occupant(b, occ));
    }
}
