use thiserror::Error;

use crate::core::types::{AgentId, Position};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("map rows have inconsistent widths")]
    MapNotRectangular,

    #[error("map must be at least 3x3, got {width}x{height}")]
    MapTooSmall { width: usize, height: usize },

    #[error("border cell at ({}, {}) is not a wall", .0.x, .0.y)]
    BorderNotWall(Position),

    #[error("map has no enterable interior cells")]
    NoOpenCells,

    #[error("no decision supplied for live agent {0:?}")]
    MissingDecision(AgentId),

    #[error("unknown agent: {0:?}")]
    UnknownAgent(AgentId),

    #[error("no empty cell found after {attempts} attempts")]
    NoEmptyCell { attempts: u32 },

    #[error("cell ({}, {}) is not a valid spawn location", .0.x, .0.y)]
    InvalidSpawn(Position),
}

pub type Result<T> = std::result::Result<T, EngineError>;
