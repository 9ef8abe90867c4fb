//! Missile state

use serde::Serialize;

use crate::core::types::{AgentId, Direction, MissileId, Position};

/// A missile in flight
///
/// Missiles are owned exclusively by the simulation's flying collection;
/// the grid only references them by id. A missile stops flying when it
/// strikes a wall, leaves the grid, outlives `missile_lifetime`, or hits
/// a tank.
#[derive(Debug, Clone, Serialize)]
pub struct Missile {
    pub id: MissileId,
    pub owner: AgentId,
    pub direction: Direction,
    pub position: Position,
    pub turns_flown: u32,
    pub flying: bool,
}

impl Missile {
    pub fn new(id: MissileId, owner: AgentId, position: Position, direction: Direction) -> Self {
        Self {
            id,
            owner,
            direction,
            position,
            turns_flown: 0,
            flying: true,
        }
    }
}
