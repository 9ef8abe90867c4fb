//! Tank Arena - deterministic turn-based tank combat simulation engine
//!
//! The engine applies and adjudicates per-turn decisions for a set of
//! tanks on a walled grid: movement and firing, collision resolution,
//! missile flight, resource spawning, and per-tank sensor computation.
//! Decision making, rendering, and map parsing live outside this crate.

pub mod core;
pub mod simulation;
pub mod world;

pub use crate::core::{EngineConfig, EngineError, Result};
pub use crate::simulation::{Decision, DecisionSet, MapSpec, Simulation};
