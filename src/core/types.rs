//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};

/// Simulation turn counter (discrete time unit)
pub type Tick = u64;

/// Unique identifier for agents (tanks)
///
/// Ids are arena indices assigned in spawn order; all tie-breaks in the
/// engine resolve in ascending id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Unique identifier for flying missiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MissileId(pub u32);

/// A cell coordinate on the grid
///
/// `x` grows eastward, `y` grows southward; `(0, 0)` is the north-west
/// corner. Positions are always within grid bounds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The adjacent cell one step in `direction`, or `None` when the step
    /// would leave a `width` x `height` grid.
    pub fn step(&self, direction: Direction, width: usize, height: usize) -> Option<Self> {
        let (dx, dy) = direction.delta();
        let x = self.x as isize + dx;
        let y = self.y as isize + dy;

        if x >= 0 && (x as usize) < width && y >= 0 && (y as usize) < height {
            Some(Self {
                x: x as usize,
                y: y as usize,
            })
        } else {
            None
        }
    }

    /// Manhattan distance to `other`
    pub fn manhattan(&self, other: &Position) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Absolute cardinal facing on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit offset of this direction as `(dx, dy)`
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// 90 degrees counter-clockwise
    pub fn left(&self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    /// 90 degrees clockwise
    pub fn right(&self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn rotated(&self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::Left => self.left(),
            Rotation::Right => self.right(),
        }
    }
}

/// A direction relative to an agent's facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelativeDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl RelativeDirection {
    pub const ALL: [RelativeDirection; 4] = [
        RelativeDirection::Forward,
        RelativeDirection::Backward,
        RelativeDirection::Left,
        RelativeDirection::Right,
    ];

    /// Map this relative direction onto the grid given the agent's facing
    pub fn to_absolute(&self, facing: Direction) -> Direction {
        match self {
            RelativeDirection::Forward => facing,
            RelativeDirection::Backward => facing.opposite(),
            RelativeDirection::Left => facing.left(),
            RelativeDirection::Right => facing.right(),
        }
    }

    /// Express an absolute direction in the relative frame of `facing`
    pub fn from_absolute(direction: Direction, facing: Direction) -> Self {
        if direction == facing {
            RelativeDirection::Forward
        } else if direction == facing.opposite() {
            RelativeDirection::Backward
        } else if direction == facing.left() {
            RelativeDirection::Left
        } else {
            RelativeDirection::Right
        }
    }
}

/// A quarter-turn rotation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    Left,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_rotations() {
        assert_eq!(Direction::North.left(), Direction::West);
        assert_eq!(Direction::North.right(), Direction::East);
        assert_eq!(Direction::West.opposite(), Direction::East);

        for dir in Direction::ALL {
            assert_eq!(dir.left().right(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.left().left(), dir.opposite());
        }
    }

    #[test]
    fn test_relative_roundtrip() {
        for facing in Direction::ALL {
            for rel in RelativeDirection::ALL {
                let abs = rel.to_absolute(facing);
                assert_eq!(RelativeDirection::from_absolute(abs, facing), rel);
            }
        }
    }

    #[test]
    fn test_position_step_bounds() {
        let pos = Position::new(0, 0);
        assert_eq!(pos.step(Direction::North, 10, 10), None);
        assert_eq!(pos.step(Direction::West, 10, 10), None);
        assert_eq!(pos.step(Direction::South, 10, 10), Some(Position::new(0, 1)));

        let edge = Position::new(9, 9);
        assert_eq!(edge.step(Direction::East, 10, 10), None);
        assert_eq!(edge.step(Direction::South, 10, 10), None);
    }

    #[test]
    fn test_manhattan() {
        let a = Position::new(2, 3);
        let b = Position::new(5, 1);
        assert_eq!(a.manhattan(&b), 5);
        assert_eq!(b.manhattan(&a), 5);
        assert_eq!(a.manhattan(&a), 0);
    }
}
