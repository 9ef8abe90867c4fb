//! Turn-synchronous simulation core
//!
//! One `step()` call runs the entire per-turn pipeline to completion:
//! decisions, tentative moves and firing, collision resolution, projectile
//! flight, pickups and recharge, resurrection, resource spawning, and the
//! sensor refresh. A step is a pure function of (previous state, decisions,
//! rng state); nothing in here blocks, and external collaborators only ever
//! see snapshots and accessor calls.

mod collision;
pub mod decision;
pub mod sensors;
mod spawning;

pub use decision::{Decision, DecisionSet};
pub use sensors::{DirectionFlags, RadarEcho, RadarImage, SensorReport, Smell};

use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, trace};

use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, Result};
use crate::core::rng::RandomSource;
use crate::core::types::{AgentId, Direction, MissileId, Position, Tick};
use crate::world::agent::{Agent, HitOutcome};
use crate::world::grid::{Grid, MapTile, Occupant, Terrain};
use crate::world::projectile::Missile;

use spawning::BucketSpawner;

/// Already-parsed map input handed over by the external loader
#[derive(Debug, Clone)]
pub struct MapSpec {
    pub tiles: Vec<Vec<MapTile>>,
    /// Fixed seeding for replayable runs; entropy seeding otherwise
    pub deterministic: bool,
    /// Seed used when `deterministic` is set
    pub seed: u64,
}

/// Read-only copy of one tank's public state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub color: String,
    pub position: Position,
    pub facing: Direction,
    pub health: u32,
    pub energy: u32,
    pub ammo: u32,
    pub alive: bool,
    pub crashed: bool,
    pub score: u32,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            color: agent.color.clone(),
            position: agent.position,
            facing: agent.facing,
            health: agent.health,
            energy: agent.energy,
            ammo: agent.ammo,
            alive: agent.alive,
            crashed: agent.crashed,
            score: agent.score,
        }
    }
}

/// Read-only copy of one missile in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissileSnapshot {
    pub id: MissileId,
    pub owner: AgentId,
    pub position: Position,
    pub direction: Direction,
}

impl From<&Missile> for MissileSnapshot {
    fn from(missile: &Missile) -> Self {
        Self {
            id: missile.id,
            owner: missile.owner,
            position: missile.position,
            direction: missile.direction,
        }
    }
}

/// The tank combat simulation
///
/// Owns the grid, both arenas, and the random source; an explicit value
/// passed by reference to collaborators, never a process-wide singleton.
pub struct Simulation {
    config: EngineConfig,
    grid: Grid,
    agents: Vec<Agent>,
    missiles: Vec<Missile>,
    rng: RandomSource,
    turn: Tick,
    resurrection_queue: Vec<AgentId>,
    bucket_spawner: BucketSpawner,
    next_missile_id: u32,
    sensor_reports: AHashMap<AgentId, SensorReport>,
}

impl Simulation {
    /// Build a simulation from a parsed map
    ///
    /// Refuses malformed maps outright rather than substituting defaults.
    pub fn new(map: MapSpec, config: EngineConfig) -> Result<Self> {
        let grid = Grid::from_tiles(&map.tiles)?;
        let rng = if map.deterministic {
            RandomSource::seeded(map.seed)
        } else {
            RandomSource::from_entropy()
        };

        Ok(Self {
            config,
            grid,
            agents: Vec::new(),
            missiles: Vec::new(),
            rng,
            turn: 0,
            resurrection_queue: Vec::new(),
            bucket_spawner: BucketSpawner::default(),
            next_missile_id: 0,
            sensor_reports: AHashMap::new(),
        })
    }

    /// Add a tank at a random open cell with a random facing
    pub fn spawn_agent(&mut self, color: impl Into<String>) -> Result<AgentId> {
        let position = spawning::find_random_empty_cell(&self.grid, &mut self.rng, &self.config)?;
        let facing = self.rng.next_direction();
        self.spawn_agent_at(color, position, facing)
    }

    /// Add a tank at an explicitly configured cell and facing
    pub fn spawn_agent_at(
        &mut self,
        color: impl Into<String>,
        position: Position,
        facing: Direction,
    ) -> Result<AgentId> {
        let inside = position.x < self.grid.width() && position.y < self.grid.height();
        if !inside
            || !self.grid.is_enterable(position)
            || self.grid.agents_at(position).next().is_some()
        {
            return Err(EngineError::InvalidSpawn(position));
        }

        let id = AgentId(self.agents.len() as u32);
        self.agents
            .push(Agent::new(id, color.into(), position, facing, &self.config));
        self.grid.add_occupant(position, Occupant::Agent(id));

        // Give the new tank (and everyone else) perception before turn 1.
        self.refresh_sensors();
        Ok(id)
    }

    /// Run one complete turn
    ///
    /// Requires exactly one decision per live agent; a missing decision is
    /// a logic error in the decision producer and fails the step before
    /// any state changes.
    pub fn step(&mut self, decisions: &DecisionSet) -> Result<()> {
        for agent in self.agents.iter().filter(|agent| agent.alive) {
            if decisions.get(agent.id).is_none() {
                return Err(EngineError::MissingDecision(agent.id));
            }
        }

        self.turn += 1;
        for agent in self.agents.iter_mut().filter(|agent| agent.alive) {
            agent.begin_turn();
        }

        self.apply_decisions(decisions);
        collision::resolve(&mut self.grid, &mut self.agents);
        self.collect_pickups();
        self.apply_terrain_and_upkeep();
        self.advance_missiles();
        self.resurrect_dead();
        self.spawn_buckets();
        self.refresh_sensors();
        Ok(())
    }

    // === Query surface ===

    pub fn turn_count(&self) -> Tick {
        self.turn
    }

    /// True once any tank reached the winning score, or the optional turn
    /// limit expired
    pub fn is_game_over(&self) -> bool {
        let scored = self
            .agents
            .iter()
            .any(|agent| agent.score >= self.config.win_score);
        let timed_out = self
            .config
            .max_turns
            .map_or(false, |limit| self.turn >= limit);
        scored || timed_out
    }

    /// Read-only world terrain/occupancy queries
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn agent(&self, id: AgentId) -> Result<&Agent> {
        self.agents
            .get(id.0 as usize)
            .ok_or(EngineError::UnknownAgent(id))
    }

    pub fn agents_snapshot(&self) -> Vec<AgentSnapshot> {
        self.agents.iter().map(AgentSnapshot::from).collect()
    }

    pub fn missiles_snapshot(&self) -> Vec<MissileSnapshot> {
        self.missiles
            .iter()
            .filter(|missile| missile.flying)
            .map(MissileSnapshot::from)
            .collect()
    }

    /// Latest sensor report for a live agent
    pub fn sensors(&self, id: AgentId) -> Option<&SensorReport> {
        self.sensor_reports.get(&id)
    }

    // === Pipeline phases ===

    fn apply_decisions(&mut self, decisions: &DecisionSet) {
        for idx in 0..self.agents.len() {
            if !self.agents[idx].alive {
                continue;
            }
            let id = self.agents[idx].id;
            let Some(decision) = decisions.get(id) else {
                continue;
            };
            trace!(agent = id.0, ?decision, "applying decision");

            {
                let config = &self.config;
                let agent = &mut self.agents[idx];
                if let Some(on) = decision.radar_on {
                    agent.radar_on = on;
                }
                if let Some(delta) = decision.radar_power_delta {
                    let setting = i64::from(agent.radar_range) + i64::from(delta);
                    agent.radar_range = setting.clamp(1, i64::from(config.radar_range_max)) as u32;
                }
                if let Some(on) = decision.shields_on {
                    agent.shields_on = on;
                }
                if let Some(rotation) = decision.rotate {
                    agent.facing = agent.facing.rotated(rotation);
                }
            }

            if let Some(relative) = decision.move_direction {
                let (position, facing) = {
                    let agent = &self.agents[idx];
                    (agent.position, agent.facing)
                };
                let direction = relative.to_absolute(facing);
                let target = position.step(direction, self.grid.width(), self.grid.height());
                match target {
                    Some(to) if self.grid.is_enterable(to) => {
                        self.grid.move_occupant(position, to, Occupant::Agent(id));
                        let agent = &mut self.agents[idx];
                        agent.position = to;
                        agent.moved = true;
                    }
                    _ => {
                        self.agents[idx].crashed = true;
                    }
                }
            }

            if decision.fire {
                self.try_fire(idx);
            }
        }
    }

    /// Spend ammunition and launch a missile one cell ahead
    ///
    /// Ammunition is spent even when the cell ahead is a wall and nothing
    /// launches; crashing this turn does not recall an earlier launch.
    /// The spawn cell itself is only hit-checked in the flight phase, once
    /// collision resolution has settled where everyone actually stands.
    fn try_fire(&mut self, idx: usize) {
        if self.agents[idx].ammo == 0 {
            return;
        }
        self.agents[idx].ammo -= 1;

        let (owner, position, facing) = {
            let agent = &self.agents[idx];
            (agent.id, agent.position, agent.facing)
        };
        let Some(spawn) = position.step(facing, self.grid.width(), self.grid.height()) else {
            return;
        };
        if !self.grid.is_enterable(spawn) {
            return;
        }

        let id = MissileId(self.next_missile_id);
        self.next_missile_id += 1;
        self.missiles.push(Missile::new(id, owner, spawn, facing));
        self.grid.add_occupant(spawn, Occupant::Missile(id));
        debug!(missile = id.0, owner = owner.0, "missile launched");
    }

    /// Damage the tank on `pos`, if any; returns true when the missile is
    /// spent. With several tanks transiently on the cell the lowest id is
    /// struck.
    fn strike_agent_at(&mut self, pos: Position, missile_id: MissileId, owner: AgentId) -> bool {
        let Some(victim_id) = self.grid.agents_at(pos).min() else {
            return false;
        };
        if !self.agents[victim_id.0 as usize].alive {
            return false;
        }

        let outcome = self.agents[victim_id.0 as usize].take_hit(&self.config);
        match outcome {
            HitOutcome::Absorbed => {
                debug!(victim = victim_id.0, "shields absorbed a missile hit");
            }
            HitOutcome::Damaged => {
                debug!(victim = victim_id.0, "missile hit");
            }
            HitOutcome::Destroyed => {
                self.grid.remove_occupant(pos, Occupant::Agent(victim_id));
                self.resurrection_queue.push(victim_id);
                if owner != victim_id {
                    self.agents[owner.0 as usize].score += self.config.kill_score;
                }
                debug!(victim = victim_id.0, by = owner.0, "tank destroyed");
            }
        }

        self.grid.remove_occupant(pos, Occupant::Missile(missile_id));
        true
    }

    /// Consume ammunition buckets under resolved tank positions
    fn collect_pickups(&mut self) {
        for idx in 0..self.agents.len() {
            if !self.agents[idx].alive {
                continue;
            }
            let position = self.agents[idx].position;
            if self.grid.remove_occupant(position, Occupant::AmmoBucket) {
                self.agents[idx].ammo += self.config.ammo_bucket_refill;
                debug!(agent = self.agents[idx].id.0, "picked up ammunition bucket");
            }
        }
    }

    /// Recharge squares, then radar/shield upkeep
    ///
    /// A device whose upkeep cannot be paid shuts off for the turn before
    /// its effect applies.
    fn apply_terrain_and_upkeep(&mut self) {
        for idx in 0..self.agents.len() {
            let config = &self.config;
            let agent = &mut self.agents[idx];
            if !agent.alive {
                continue;
            }

            match self.grid.terrain_at(agent.position) {
                Terrain::EnergyRecharge => {
                    agent.energy = (agent.energy + config.energy_recharge).min(config.max_energy);
                }
                Terrain::HealthRecharge => {
                    agent.health = (agent.health + config.health_recharge).min(config.max_health);
                }
                Terrain::Open | Terrain::Wall => {}
            }

            if agent.radar_on {
                if agent.energy >= agent.radar_range {
                    agent.energy -= agent.radar_range;
                } else {
                    agent.radar_on = false;
                }
            }
            if agent.shields_on {
                if agent.energy >= config.shield_energy_cost {
                    agent.energy -= config.shield_energy_cost;
                } else {
                    agent.shields_on = false;
                }
            }
        }
    }

    /// Advance every flying missile one cell, strictly after collision
    /// resolution for tank moves
    fn advance_missiles(&mut self) {
        for idx in 0..self.missiles.len() {
            if !self.missiles[idx].flying {
                continue;
            }
            let (id, owner, position, direction, flown) = {
                let missile = &self.missiles[idx];
                (
                    missile.id,
                    missile.owner,
                    missile.position,
                    missile.direction,
                    missile.turns_flown,
                )
            };

            // Point-blank: a missile launched this turn adjudicates its
            // spawn cell now that all tank positions are final.
            if flown == 0 && self.strike_agent_at(position, id, owner) {
                self.missiles[idx].flying = false;
                continue;
            }

            self.grid.remove_occupant(position, Occupant::Missile(id));
            let target = position
                .step(direction, self.grid.width(), self.grid.height())
                .filter(|pos| self.grid.is_enterable(*pos));

            match target {
                Some(to) if flown < self.config.missile_lifetime => {
                    {
                        let missile = &mut self.missiles[idx];
                        missile.position = to;
                        missile.turns_flown = flown + 1;
                    }
                    self.grid.add_occupant(to, Occupant::Missile(id));
                    if self.strike_agent_at(to, id, owner) {
                        self.missiles[idx].flying = false;
                    }
                }
                _ => {
                    self.missiles[idx].flying = false;
                    debug!(missile = id.0, "missile destroyed");
                }
            }
        }
        self.missiles.retain(|missile| missile.flying);
    }

    /// Place tanks that died this turn back onto the grid with full stats
    fn resurrect_dead(&mut self) {
        let queue = std::mem::take(&mut self.resurrection_queue);
        for id in queue {
            match spawning::find_random_empty_cell(&self.grid, &mut self.rng, &self.config) {
                Ok(position) => {
                    let facing = self.rng.next_direction();
                    self.agents[id.0 as usize].resurrect(position, facing, &self.config);
                    self.grid.add_occupant(position, Occupant::Agent(id));
                    debug!(agent = id.0, x = position.x, y = position.y, "tank resurrected");
                }
                Err(_) => {
                    debug!(agent = id.0, "no empty cell to resurrect into, deferring");
                    self.resurrection_queue.push(id);
                }
            }
        }
    }

    fn spawn_buckets(&mut self) {
        let count = self.grid.bucket_count();
        self.bucket_spawner
            .tick(&mut self.grid, count, &mut self.rng, &self.config);
    }

    fn refresh_sensors(&mut self) {
        self.sensor_reports =
            sensors::compute_reports(&self.grid, &self.agents, &self.missiles, &self.config);
    }
}
