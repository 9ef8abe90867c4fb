//! Sensor computation
//!
//! Runs after all world mutation for the turn is complete and derives each
//! live tank's perceptual inputs for the next decision. Sensing never
//! mutates world state and never fails on a valid world.
//!
//! Every tie-break here is deterministic and part of the contract: scans
//! walk agents in ascending id order and a strict comparison keeps the
//! first (lowest-id) candidate at minimal distance.

use ahash::AHashMap;
use serde::Serialize;

use crate::core::config::EngineConfig;
use crate::core::types::{AgentId, Direction, Position, RelativeDirection};
use crate::world::agent::Agent;
use crate::world::grid::{Grid, Occupant, Terrain};
use crate::world::projectile::Missile;

/// Classification of one radar-visible cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RadarEcho {
    Open,
    Wall,
    EnergyRecharge,
    HealthRecharge,
    AmmoBucket,
    Tank(AgentId),
}

/// Radar rays in listener-relative order: left, center, right
pub const RADAR_RAYS: usize = 3;

/// One radar sweep: three forward rays up to the radar range setting
///
/// `cells[ray][d]` is the echo at distance `d` along the given ray
/// (`ray` 0 = one cell left of the facing line, 1 = straight ahead,
/// 2 = one cell right). The center ray starts at distance 1, the side
/// rays at distance 0 (directly beside the tank). A ray stops at the
/// first non-enterable cell; that cell is still reported, and cells
/// behind it are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarImage {
    pub range: u32,
    pub cells: Vec<Vec<Option<RadarEcho>>>,
    /// Effective distance each ray traversed before being blocked
    pub distances: [u32; RADAR_RAYS],
}

/// Nearest-tank scent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Smell {
    pub color: String,
    pub distance: usize,
}

/// One boolean per relative direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectionFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionFlags {
    pub fn get(&self, direction: RelativeDirection) -> bool {
        match direction {
            RelativeDirection::Forward => self.forward,
            RelativeDirection::Backward => self.backward,
            RelativeDirection::Left => self.left,
            RelativeDirection::Right => self.right,
        }
    }

    fn set(&mut self, direction: RelativeDirection) {
        match direction {
            RelativeDirection::Forward => self.forward = true,
            RelativeDirection::Backward => self.backward = true,
            RelativeDirection::Left => self.left = true,
            RelativeDirection::Right => self.right = true,
        }
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Everything one tank perceives at the end of a turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReport {
    /// Radar image, present only while the radar is on
    pub radar: Option<RadarImage>,
    /// Nearest other live tank within smell range
    pub smell: Option<Smell>,
    /// Direction of the nearest tank that moved this turn, within hearing
    /// range; `None` is silence
    pub sound: Option<RelativeDirection>,
    /// Directions from which a missile on this row or column approaches
    pub incoming: DirectionFlags,
    /// Adjacent cells that cannot be entered next turn
    pub blocked: DirectionFlags,
    /// Directions from which another tank's radar sweep crosses this cell
    pub rwaves: DirectionFlags,
}

/// Compute sensor reports for every live agent
pub(crate) fn compute_reports(
    grid: &Grid,
    agents: &[Agent],
    missiles: &[Missile],
    config: &EngineConfig,
) -> AHashMap<AgentId, SensorReport> {
    // Radar first: the sweeps also feed rwave detection for everyone else.
    let mut radar_images: AHashMap<AgentId, RadarImage> = AHashMap::new();
    let mut coverage: Vec<(AgentId, Position, Direction)> = Vec::new();

    for agent in agents.iter().filter(|agent| agent.alive && agent.radar_on) {
        let image = sweep_radar(grid, agent, &mut coverage);
        radar_images.insert(agent.id, image);
    }

    let mut reports = AHashMap::new();
    for agent in agents.iter().filter(|agent| agent.alive) {
        reports.insert(
            agent.id,
            SensorReport {
                radar: radar_images.remove(&agent.id),
                smell: smell_nearest(agent, agents, config),
                sound: hear_nearest_mover(agent, agents, config),
                incoming: incoming_missiles(agent, missiles),
                blocked: blocked_directions(grid, agent),
                rwaves: radar_waves(agent, &coverage),
            },
        );
    }
    reports
}

/// Raycast the three radar columns for one tank
fn sweep_radar(
    grid: &Grid,
    agent: &Agent,
    coverage: &mut Vec<(AgentId, Position, Direction)>,
) -> RadarImage {
    let range = agent.radar_range;
    let facing = agent.facing;
    let laterals = [Some(facing.left()), None, Some(facing.right())];

    let mut cells = vec![vec![None; range as usize + 1]; RADAR_RAYS];
    let mut distances = [range; RADAR_RAYS];

    for (ray, lateral) in laterals.iter().enumerate() {
        // The side rays include the cells directly beside the tank; the
        // center ray starts one cell ahead.
        let start = if lateral.is_some() { 0 } else { 1 };

        for d in start..=range {
            let Some(pos) = ray_cell(grid, agent.position, facing, *lateral, d) else {
                distances[ray] = d;
                break;
            };

            coverage.push((agent.id, pos, facing));
            cells[ray][d as usize] = Some(classify(grid, pos));

            if !grid.is_enterable(pos) {
                // The blocking cell is reported, but the ray ends here.
                distances[ray] = d;
                break;
            }
        }
    }

    RadarImage {
        range,
        cells,
        distances,
    }
}

/// Grid position of the radar cell at (lateral, distance), if on the grid
fn ray_cell(
    grid: &Grid,
    origin: Position,
    facing: Direction,
    lateral: Option<Direction>,
    distance: u32,
) -> Option<Position> {
    let mut pos = origin;
    if let Some(side) = lateral {
        pos = pos.step(side, grid.width(), grid.height())?;
    }
    for _ in 0..distance {
        pos = pos.step(facing, grid.width(), grid.height())?;
    }
    Some(pos)
}

fn classify(grid: &Grid, pos: Position) -> RadarEcho {
    if let Some(id) = grid.agents_at(pos).next() {
        return RadarEcho::Tank(id);
    }
    if grid
        .occupants_at(pos)
        .iter()
        .any(|occ| *occ == Occupant::AmmoBucket)
    {
        return RadarEcho::AmmoBucket;
    }
    match grid.terrain_at(pos) {
        Terrain::Wall => RadarEcho::Wall,
        Terrain::EnergyRecharge => RadarEcho::EnergyRecharge,
        Terrain::HealthRecharge => RadarEcho::HealthRecharge,
        Terrain::Open => RadarEcho::Open,
    }
}

/// Nearest other live tank by Manhattan distance, lowest id on ties
fn smell_nearest(agent: &Agent, agents: &[Agent], config: &EngineConfig) -> Option<Smell> {
    let mut best: Option<(usize, &Agent)> = None;
    for other in agents
        .iter()
        .filter(|other| other.alive && other.id != agent.id)
    {
        let distance = agent.position.manhattan(&other.position);
        if best.map_or(true, |(bd, _)| distance < bd) {
            best = Some((distance, other));
        }
    }

    best.filter(|(distance, _)| *distance <= config.smell_range)
        .map(|(distance, other)| Smell {
            color: other.color.clone(),
            distance,
        })
}

/// Nearest tank that changed cells this turn, lowest id on ties
///
/// The reported direction is the dominant axis of the offset mapped into
/// the listener's frame; on a perfect diagonal the x axis wins.
fn hear_nearest_mover(
    agent: &Agent,
    agents: &[Agent],
    config: &EngineConfig,
) -> Option<RelativeDirection> {
    let mut best: Option<(usize, &Agent)> = None;
    for other in agents
        .iter()
        .filter(|other| other.alive && other.moved && other.id != agent.id)
    {
        let distance = agent.position.manhattan(&other.position);
        if best.map_or(true, |(bd, _)| distance < bd) {
            best = Some((distance, other));
        }
    }

    let (distance, mover) = best?;
    if distance > config.hearing_range {
        return None;
    }

    let dx = mover.position.x as isize - agent.position.x as isize;
    let dy = mover.position.y as isize - agent.position.y as isize;
    let cardinal = if dx.abs() >= dy.abs() {
        if dx > 0 {
            Direction::East
        } else {
            Direction::West
        }
    } else if dy > 0 {
        Direction::South
    } else {
        Direction::North
    };
    Some(RelativeDirection::from_absolute(cardinal, agent.facing))
}

/// Flag every missile sharing this tank's row or column and closing in
fn incoming_missiles(agent: &Agent, missiles: &[Missile]) -> DirectionFlags {
    let mut flags = DirectionFlags::default();
    let pos = agent.position;

    for missile in missiles.iter().filter(|missile| missile.flying) {
        let mp = missile.position;
        let approach = if mp.x == pos.x && mp.y != pos.y {
            let toward = if mp.y > pos.y {
                Direction::North
            } else {
                Direction::South
            };
            (missile.direction == toward).then(|| toward.opposite())
        } else if mp.y == pos.y && mp.x != pos.x {
            let toward = if mp.x > pos.x {
                Direction::West
            } else {
                Direction::East
            };
            (missile.direction == toward).then(|| toward.opposite())
        } else {
            None
        };

        if let Some(from) = approach {
            // Report the side the missile comes from.
            flags.set(RelativeDirection::from_absolute(from, agent.facing));
        }
    }
    flags
}

/// Adjacent cells that are walls or hold another tank
fn blocked_directions(grid: &Grid, agent: &Agent) -> DirectionFlags {
    let mut flags = DirectionFlags::default();
    for relative in RelativeDirection::ALL {
        let direction = relative.to_absolute(agent.facing);
        let blocked = match agent
            .position
            .step(direction, grid.width(), grid.height())
        {
            Some(pos) => !grid.is_enterable(pos) || grid.agents_at(pos).next().is_some(),
            None => true,
        };
        if blocked {
            flags.set(relative);
        }
    }
    flags
}

/// Directions from which another tank's radar sweep crosses this cell
///
/// A ray traveling in direction `d` through this cell arrives from the
/// opposite side, expressed in this tank's relative frame.
fn radar_waves(agent: &Agent, coverage: &[(AgentId, Position, Direction)]) -> DirectionFlags {
    let mut flags = DirectionFlags::default();
    for (scanner, pos, travel) in coverage {
        if *scanner != agent.id && *pos == agent.position {
            flags.set(RelativeDirection::from_absolute(
                travel.opposite(),
                agent.facing,
            ));
        }
    }
    flags
}
