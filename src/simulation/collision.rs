//! Collision resolution for tentative moves
//!
//! Decision application relocates tanks optimistically, so a cell can end
//! the tentative phase with several tanks on it, and two tanks can swap
//! cells without either cell being multiply occupied. Both situations are
//! head-on collisions: every involved tank is marked crashed and restored
//! to its pre-turn position and facing.
//!
//! Undoing a move can itself create a new conflict at the restored cell,
//! so resolution runs as a fixed-point loop, bounded by the live agent
//! count. All scans walk agents in ascending id order; the outcome never
//! depends on hash-map iteration order.

use ahash::AHashMap;
use tracing::debug;

use crate::core::types::Position;
use crate::world::agent::Agent;
use crate::world::grid::{Grid, Occupant};

/// Resolve all multi-occupancy and crossover conflicts; returns the number
/// of undone moves.
pub(crate) fn resolve(grid: &mut Grid, agents: &mut [Agent]) -> usize {
    let live_count = agents.iter().filter(|agent| agent.alive).count();
    let mut undone_total = 0;

    for _pass in 0..live_count {
        let mut to_undo = Vec::new();

        // Multi-occupancy: more than one live tank on one cell.
        let mut occupancy: AHashMap<Position, usize> = AHashMap::new();
        for agent in agents.iter().filter(|agent| agent.alive) {
            *occupancy.entry(agent.position).or_insert(0) += 1;
        }
        for agent in agents.iter().filter(|agent| agent.alive) {
            if occupancy[&agent.position] > 1 {
                to_undo.push(agent.id);
            }
        }

        // Crossovers: pairs that swapped cells this turn.
        for i in 0..agents.len() {
            if !agents[i].alive || agents[i].position == agents[i].previous_position {
                continue;
            }
            for j in (i + 1)..agents.len() {
                if !agents[j].alive {
                    continue;
                }
                if agents[i].position == agents[j].previous_position
                    && agents[j].position == agents[i].previous_position
                {
                    to_undo.push(agents[i].id);
                    to_undo.push(agents[j].id);
                }
            }
        }

        if to_undo.is_empty() {
            break;
        }
        to_undo.sort();
        to_undo.dedup();

        // An undo only changes the world when the tank actually moved this
        // turn; stationary tanks caught in a pile-up are just marked
        // crashed. Only real position changes can create new conflicts, so
        // the loop ends on the first pass that moves nobody.
        let mut undone_this_pass = 0;
        for id in to_undo {
            let agent = &mut agents[id.0 as usize];
            let was_at = agent.position;
            agent.undo_move();
            if was_at != agent.position {
                grid.move_occupant(was_at, agent.position, Occupant::Agent(id));
                undone_this_pass += 1;
            }
        }

        undone_total += undone_this_pass;
        if undone_this_pass == 0 {
            break;
        }
    }

    if undone_total > 0 {
        debug!(undone = undone_total, "collision resolution undid moves");
    }
    undone_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::core::types::{AgentId, Direction, Position};
    use crate::world::grid::MapTile;

    fn open_grid(size: usize) -> Grid {
        let tiles: Vec<Vec<MapTile>> = (0..size)
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
            .collect();
        Grid::from_tiles(&tiles).unwrap()
    }

    fn place(grid: &mut Grid, id: u32, pos: Position, facing: Direction) -> Agent {
        let mut agent = Agent::new(
            AgentId(id),
            format!("agent-{id}"),
            pos,
            facing,
            &EngineConfig::default(),
        );
        grid.add_occupant(pos, Occupant::Agent(agent.id));
        agent.begin_turn();
        agent
    }

    fn tentative_move(grid: &mut Grid, agent: &mut Agent, to: Position) {
        grid.move_occupant(agent.position, to, Occupant::Agent(agent.id));
        agent.position = to;
        agent.moved = true;
    }

    #[test]
    fn test_two_movers_into_same_cell_both_undone() {
        let mut grid = open_grid(8);
        let mut a = place(&mut grid, 0, Position::new(2, 3), Direction::East);
        let mut b = place(&mut grid, 1, Position::new(4, 3), Direction::West);
        let contested = Position::new(3, 3);
        tentative_move(&mut grid, &mut a, contested);
        tentative_move(&mut grid, &mut b, contested);

        let mut agents = vec![a, b];
        let undone = resolve(&mut grid, &mut agents);

        assert_eq!(undone, 2);
        assert_eq!(agents[0].position, Position::new(2, 3));
        assert_eq!(agents[1].position, Position::new(4, 3));
        assert!(agents[0].crashed && agents[1].crashed);
        assert!(grid.agents_at(contested).next().is_none());
    }

    #[test]
    fn test_mover_into_stationary_tank_undone() {
        let mut grid = open_grid(8);
        let mut a = place(&mut grid, 0, Position::new(2, 2), Direction::East);
        let b = place(&mut grid, 1, Position::new(3, 2), Direction::North);
        tentative_move(&mut grid, &mut a, Position::new(3, 2));

        let mut agents = vec![a, b];
        resolve(&mut grid, &mut agents);

        assert_eq!(agents[0].position, Position::new(2, 2));
        assert_eq!(agents[1].position, Position::new(3, 2));
        // Both participants in the pile-up crash, mover and target alike.
        assert!(agents[0].crashed && agents[1].crashed);
    }

    #[test]
    fn test_crossover_detected_and_undone() {
        let mut grid = open_grid(8);
        let mut a = place(&mut grid, 0, Position::new(3, 3), Direction::East);
        let mut b = place(&mut grid, 1, Position::new(4, 3), Direction::West);
        tentative_move(&mut grid, &mut a, Position::new(4, 3));
        tentative_move(&mut grid, &mut b, Position::new(3, 3));

        let mut agents = vec![a, b];
        let undone = resolve(&mut grid, &mut agents);

        assert_eq!(undone, 2);
        assert_eq!(agents[0].position, Position::new(3, 3));
        assert_eq!(agents[1].position, Position::new(4, 3));
        assert!(agents[0].crashed && agents[1].crashed);
    }

    #[test]
    fn test_undo_chain_reaches_fixed_point() {
        // a and b collide at (3,2); undoing a puts it back at (2,2) where
        // d also moved this turn. The second pass must undo d as well.
        let mut grid = open_grid(8);
        let mut a = place(&mut grid, 0, Position::new(2, 2), Direction::East);
        let b = place(&mut grid, 1, Position::new(3, 2), Direction::North);
        let mut d = place(&mut grid, 2, Position::new(2, 3), Direction::North);

        tentative_move(&mut grid, &mut a, Position::new(3, 2));
        tentative_move(&mut grid, &mut d, Position::new(2, 2));

        let mut agents = vec![a, b, d];
        resolve(&mut grid, &mut agents);

        assert_eq!(agents[0].position, Position::new(2, 2));
        assert_eq!(agents[1].position, Position::new(3, 2));
        assert_eq!(agents[2].position, Position::new(2, 3));

        // No cell holds two tanks afterwards.
        for y in 0..8 {
            for x in 0..8 {
                let pos = Position::new(x, y);
                if grid.is_enterable(pos) {
                    assert!(grid.agents_at(pos).count() <= 1);
                }
            }
        }
    }

    #[test]
    fn test_clean_moves_left_alone() {
        let mut grid = open_grid(8);
        let mut a = place(&mut grid, 0, Position::new(2, 2), Direction::East);
        let mut b = place(&mut grid, 1, Position::new(5, 5), Direction::West);
        tentative_move(&mut grid, &mut a, Position::new(3, 2));
        tentative_move(&mut grid, &mut b, Position::new(4, 5));

        let mut agents = vec![a, b];
        let undone = resolve(&mut grid, &mut agents);

        assert_eq!(undone, 0);
        assert_eq!(agents[0].position, Position::new(3, 2));
        assert_eq!(agents[1].position, Position::new(4, 5));
        assert!(!agents[0].crashed && !agents[1].crashed);
    }
}
