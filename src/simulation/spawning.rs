//! Random placement, resurrection, and resource spawning

use tracing::debug;

use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::rng::RandomSource;
use crate::core::types::Position;
use crate::world::grid::{Grid, Occupant};

/// Sample a uniformly random interior cell that is enterable and empty
///
/// Empty means no occupant of any kind, so tanks never resurrect on top of
/// missiles or buckets and buckets never stack. The search is bounded by
/// `config.empty_cell_attempts`; a saturated grid yields `NoEmptyCell` and
/// the caller defers its placement to a later turn.
pub(crate) fn find_random_empty_cell(
    grid: &Grid,
    rng: &mut RandomSource,
    config: &EngineConfig,
) -> Result<Position> {
    let interior_width = grid.width() - 2;
    let interior_height = grid.height() - 2;

    for _ in 0..config.empty_cell_attempts {
        let pos = Position::new(
            1 + rng.next_index(interior_width),
            1 + rng.next_index(interior_height),
        );
        if grid.is_enterable(pos) && grid.occupants_at(pos).is_empty() {
            return Ok(pos);
        }
    }
    Err(EngineError::NoEmptyCell {
        attempts: config.empty_cell_attempts,
    })
}

/// Elapsed-turn state driving probabilistic ammunition bucket spawns
///
/// The spawn chance grows linearly with the number of turns since the last
/// spawn, giving a bounded average bucket density without a fixed schedule.
#[derive(Debug, Clone, Default)]
pub(crate) struct BucketSpawner {
    turns_since_spawn: u32,
}

impl BucketSpawner {
    /// Advance one turn and possibly place a bucket; returns its position.
    ///
    /// The rng is only consulted while the grid is below the bucket cap,
    /// and a failed placement (saturated grid) keeps the elapsed counter
    /// so the attempt repeats next turn.
    pub(crate) fn tick(
        &mut self,
        grid: &mut Grid,
        bucket_count: u32,
        rng: &mut RandomSource,
        config: &EngineConfig,
    ) -> Option<Position> {
        self.turns_since_spawn += 1;
        if bucket_count >= config.max_ammo_buckets {
            return None;
        }
        if f64::from(self.turns_since_spawn) / config.ammo_spawn_period <= rng.next_f64() {
            return None;
        }

        match find_random_empty_cell(grid, rng, config) {
            Ok(pos) => {
                grid.add_occupant(pos, Occupant::AmmoBucket);
                self.turns_since_spawn = 0;
                debug!(x = pos.x, y = pos.y, "spawned ammunition bucket");
                Some(pos)
            }
            Err(_) => {
                debug!("no empty cell for ammunition bucket, deferring");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::MapTile;

    fn grid_from(tiles: Vec<Vec<MapTile>>) -> Grid {
        Grid::from_tiles(&tiles).unwrap()
    }

    fn walled(size: usize) -> Vec<Vec<MapTile>> {
        (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| {
                        if x == 0 || y == 0 || x == size - 1 || y == size - 1 {
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
    fn test_finds_the_single_empty_cell() {
        // 3x3 map has exactly one interior cell.
        let grid = grid_from(walled(3));
        let mut rng = RandomSource::seeded(7);
        let pos = find_random_empty_cell(&grid, &mut rng, &EngineConfig::default()).unwrap();
        assert_eq!(pos, Position::new(1, 1));
    }

    #[test]
    fn test_saturated_grid_reports_no_space() {
        let mut grid = grid_from(walled(3));
        grid.add_occupant(Position::new(1, 1), Occupant::AmmoBucket);
        let mut rng = RandomSource::seeded(7);

        let result = find_random_empty_cell(&grid, &mut rng, &EngineConfig::default());
        assert!(matches!(result, Err(EngineError::NoEmptyCell { .. })));
    }

    #[test]
    fn test_spawner_respects_bucket_cap() {
        let mut grid = grid_from(walled(10));
        let mut rng = RandomSource::seeded(3);
        let config = EngineConfig::default();
        let mut spawner = BucketSpawner::default();

        for _ in 0..500 {
            let count = grid.bucket_count();
            assert!(count <= config.max_ammo_buckets);
            spawner.tick(&mut grid, count, &mut rng, &config);
        }
        assert!(grid.bucket_count() <= config.max_ammo_buckets);
    }

    #[test]
    fn test_spawner_eventually_spawns() {
        let mut grid = grid_from(walled(10));
        let mut rng = RandomSource::seeded(11);
        let config = EngineConfig::default();
        let mut spawner = BucketSpawner::default();

        let mut spawned = false;
        for _ in 0..1000 {
            let count = grid.bucket_count();
            if spawner.tick(&mut grid, count, &mut rng, &config).is_some() {
                spawned = true;
                break;
            }
        }
        assert!(spawned, "no bucket spawned in 1000 turns");
    }
}
