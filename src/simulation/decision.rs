//! Per-turn decision input from the external brain
//!
//! The engine does not generate decisions; it applies and adjudicates them.
//! Exactly one decision per live agent must be supplied for every step, and
//! a missing entry fails the step rather than silently skipping the agent.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, RelativeDirection, Rotation};

/// One agent's intended action for the current turn
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Decision {
    /// Relative move, or `None` to hold position
    pub move_direction: Option<RelativeDirection>,
    /// Quarter-turn applied before the move is evaluated
    pub rotate: Option<Rotation>,
    /// Fire a missile (ignored with no ammunition)
    pub fire: bool,
    /// Switch the radar on or off
    pub radar_on: Option<bool>,
    /// Adjust the radar range setting by this many cells
    pub radar_power_delta: Option<i32>,
    /// Raise or drop the shields
    pub shields_on: Option<bool>,
}

impl Decision {
    /// Hold position and do nothing
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn movement(direction: RelativeDirection) -> Self {
        Self {
            move_direction: Some(direction),
            ..Self::default()
        }
    }

    pub fn fire() -> Self {
        Self {
            fire: true,
            ..Self::default()
        }
    }

    pub fn rotation(rotation: Rotation) -> Self {
        Self {
            rotate: Some(rotation),
            ..Self::default()
        }
    }
}

/// The complete decision input for one step, keyed by agent id
#[derive(Debug, Clone, Default)]
pub struct DecisionSet {
    inner: AHashMap<AgentId, Decision>,
}

impl DecisionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: AgentId, decision: Decision) {
        self.inner.insert(id, decision);
    }

    pub fn get(&self, id: AgentId) -> Option<Decision> {
        self.inner.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<(AgentId, Decision)> for DecisionSet {
    fn from_iter<T: IntoIterator<Item = (AgentId, Decision)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
