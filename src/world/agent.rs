//! Tank state and per-turn bookkeeping

use serde::Serialize;

use crate::core::config::EngineConfig;
use crate::core::types::{AgentId, Direction, Position};

/// What a missile hit did to a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Shields paid for the hit; no health lost
    Absorbed,
    /// Health reduced, tank still alive
    Damaged,
    /// Health reached zero
    Destroyed,
}

/// One tank in the arena
///
/// `previous_position` and `previous_facing` are refreshed at the start of
/// every turn and retained for exactly that turn; the collision resolver
/// restores them when a tentative move has to be undone.
#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    pub id: AgentId,
    /// Display label distinguishing this tank in sensor reports
    pub color: String,
    pub position: Position,
    pub facing: Direction,
    pub health: u32,
    pub energy: u32,
    pub ammo: u32,
    pub radar_on: bool,
    /// Radar range setting, 1..=radar_range_max
    pub radar_range: u32,
    pub shields_on: bool,
    pub alive: bool,
    pub score: u32,
    /// Set when a move failed or was undone this turn
    pub crashed: bool,
    /// Set when the tank changed cells this turn; feeds the sound sense
    pub moved: bool,
    pub previous_position: Position,
    pub previous_facing: Direction,
}

impl Agent {
    pub fn new(
        id: AgentId,
        color: String,
        position: Position,
        facing: Direction,
        config: &EngineConfig,
    ) -> Self {
        Self {
            id,
            color,
            position,
            facing,
            health: config.max_health,
            energy: config.max_energy,
            ammo: config.initial_ammo,
            radar_on: false,
            radar_range: config.radar_range_default,
            shields_on: false,
            alive: true,
            score: 0,
            crashed: false,
            moved: false,
            previous_position: position,
            previous_facing: facing,
        }
    }

    /// Reset per-turn flags and record the undo baseline
    pub fn begin_turn(&mut self) {
        self.crashed = false;
        self.moved = false;
        self.previous_position = self.position;
        self.previous_facing = self.facing;
    }

    /// Restore the pre-turn position and facing after a collision
    ///
    /// Ammunition spent and missiles fired this turn are not refunded.
    pub fn undo_move(&mut self) {
        self.position = self.previous_position;
        self.facing = self.previous_facing;
        self.crashed = true;
        self.moved = false;
    }

    /// Apply one missile hit
    ///
    /// Raised shields absorb the hit for energy while the tank can pay;
    /// otherwise the shield collapses and health takes the full damage.
    /// Hitting an already-dead tank is a no-op (`Destroyed` is only
    /// returned on the transition to dead).
    pub fn take_hit(&mut self, config: &EngineConfig) -> HitOutcome {
        debug_assert!(self.alive, "dead agents are filtered out by the caller");

        if self.shields_on {
            if self.energy >= config.shield_absorb_cost {
                self.energy -= config.shield_absorb_cost;
                return HitOutcome::Absorbed;
            }
            self.shields_on = false;
        }

        self.health = self.health.saturating_sub(config.missile_damage);
        if self.health == 0 {
            self.alive = false;
            HitOutcome::Destroyed
        } else {
            HitOutcome::Damaged
        }
    }

    /// Bring a dead tank back at a fresh cell with full stats
    pub fn resurrect(&mut self, position: Position, facing: Direction, config: &EngineConfig) {
        self.position = position;
        self.facing = facing;
        self.previous_position = position;
        self.previous_facing = facing;
        self.health = config.max_health;
        self.energy = config.max_energy;
        self.ammo = config.initial_ammo;
        self.radar_on = false;
        self.radar_range = config.radar_range_default;
        self.shields_on = false;
        self.alive = true;
        self.crashed = false;
        self.moved = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_agent() -> Agent {
        Agent::new(
            AgentId(0),
            "red".to_string(),
            Position::new(3, 3),
            Direction::North,
            &EngineConfig::default(),
        )
    }

    #[test]
    fn test_undo_restores_pose() {
        let mut agent = test_agent();
        agent.begin_turn();
        agent.position = Position::new(3, 2);
        agent.facing = Direction::East;
        agent.moved = true;

        agent.undo_move();
        assert_eq!(agent.position, Position::new(3, 3));
        assert_eq!(agent.facing, Direction::North);
        assert!(agent.crashed);
        assert!(!agent.moved);
    }

    #[test]
    fn test_hits_until_destroyed() {
        let config = EngineConfig::default();
        let mut agent = test_agent();

        assert_eq!(agent.take_hit(&config), HitOutcome::Damaged);
        assert_eq!(agent.health, config.max_health - config.missile_damage);
        assert_eq!(agent.take_hit(&config), HitOutcome::Damaged);
        assert_eq!(agent.take_hit(&config), HitOutcome::Destroyed);
        assert!(!agent.alive);
        assert_eq!(agent.health, 0);
    }

    #[test]
    fn test_shields_absorb_while_energy_lasts() {
        let config = EngineConfig::default();
        let mut agent = test_agent();
        agent.shields_on = true;
        agent.energy = config.shield_absorb_cost + 10;

        assert_eq!(agent.take_hit(&config), HitOutcome::Absorbed);
        assert_eq!(agent.energy, 10);
        assert_eq!(agent.health, config.max_health);

        // Can no longer pay: shield collapses, health takes the hit.
        assert_eq!(agent.take_hit(&config), HitOutcome::Damaged);
        assert!(!agent.shields_on);
        assert_eq!(agent.health, config.max_health - config.missile_damage);
    }

    #[test]
    fn test_resurrect_resets_stats() {
        let config = EngineConfig::default();
        let mut agent = test_agent();
        agent.health = 0;
        agent.alive = false;
        agent.ammo = 0;
        agent.energy = 5;
        agent.score = 8;

        agent.resurrect(Position::new(7, 2), Direction::West, &config);
        assert!(agent.alive);
        assert_eq!(agent.health, config.max_health);
        assert_eq!(agent.energy, config.max_energy);
        assert_eq!(agent.ammo, config.initial_ammo);
        assert_eq!(agent.position, Position::new(7, 2));
        // Score survives death.
        assert_eq!(agent.score, 8);
    }
}
