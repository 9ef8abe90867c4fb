//! Headless arena runner
//!
//! Drives the engine with simple random decision producers and prints a
//! JSON summary of the final world state. This is the reference
//! "controlling loop" collaborator: it supplies exactly one decision per
//! live tank each turn and stops on `is_game_over()`.

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use tank_arena::core::types::{RelativeDirection, Rotation};
use tank_arena::world::MapTile;
use tank_arena::{Decision, DecisionSet, EngineConfig, MapSpec, Simulation};

#[derive(Parser, Debug)]
#[command(name = "arena_sim", about = "Run a headless tank arena match")]
struct Args {
    /// Seed for the world and the random brains
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Maximum number of turns to run
    #[arg(long, default_value_t = 500)]
    turns: u64,

    /// Number of tanks in the arena
    #[arg(long, default_value_t = 4)]
    tanks: usize,

    /// Side length of the (square) map
    #[arg(long, default_value_t = 20)]
    size: usize,
}

#[derive(Serialize)]
struct MatchSummary {
    seed: u64,
    turns_played: u64,
    game_over: bool,
    tanks: Vec<tank_arena::simulation::AgentSnapshot>,
}

const COLORS: [&str; 8] = [
    "red", "blue", "green", "yellow", "purple", "orange", "cyan", "magenta",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    tracing::info!(seed = args.seed, size = args.size, "starting arena match");

    let map = MapSpec {
        tiles: generate_map(args.size, args.seed),
        deterministic: true,
        seed: args.seed,
    };
    let mut sim = Simulation::new(map, EngineConfig::default())?;

    for index in 0..args.tanks {
        sim.spawn_agent(COLORS[index % COLORS.len()])?;
    }

    // Brains draw from their own stream so engine randomness stays
    // untouched by decision making.
    let mut brain_rng = ChaCha8Rng::seed_from_u64(args.seed ^ 0x9e37_79b9_7f4a_7c15);

    for _ in 0..args.turns {
        if sim.is_game_over() {
            break;
        }
        let decisions: DecisionSet = sim
            .agents_snapshot()
            .iter()
            .filter(|snapshot| snapshot.alive)
            .map(|snapshot| (snapshot.id, random_decision(&mut brain_rng)))
            .collect();
        sim.step(&decisions)?;
    }

    let summary = MatchSummary {
        seed: args.seed,
        turns_played: sim.turn_count(),
        game_over: sim.is_game_over(),
        tanks: sim.agents_snapshot(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// A bordered square map with scattered interior walls and one recharge
/// square of each kind
fn generate_map(size: usize, seed: u64) -> Vec<Vec<MapTile>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut tiles: Vec<Vec<MapTile>> = (0..size)
        .map(|y| {
            (0..size)
                .map(|x| {
                    if x == 0 || y == 0 || x == size - 1 || y == size - 1 {
                        MapTile::Wall
                    } else if rng.gen_bool(0.08) {
                        MapTile::Wall
                    } else {
                        MapTile::Open
                    }
                })
                .collect()
        })
        .collect();

    let place = |tile: MapTile, rng: &mut ChaCha8Rng, tiles: &mut Vec<Vec<MapTile>>| loop {
        let x = rng.gen_range(1..size - 1);
        let y = rng.gen_range(1..size - 1);
        if tiles[y][x] == MapTile::Open {
            tiles[y][x] = tile;
            break;
        }
    };
    place(MapTile::Energy, &mut rng, &mut tiles);
    place(MapTile::Health, &mut rng, &mut tiles);
    place(MapTile::Ammo, &mut rng, &mut tiles);

    tiles
}

fn random_decision(rng: &mut ChaCha8Rng) -> Decision {
    let move_direction = match rng.gen_range(0..6) {
        0 | 1 | 2 => Some(RelativeDirection::Forward),
        3 => Some(RelativeDirection::Left),
        4 => Some(RelativeDirection::Right),
        _ => None,
    };
    let rotate = match rng.gen_range(0..5) {
        0 => Some(Rotation::Left),
        1 => Some(Rotation::Right),
        _ => None,
    };
    Decision {
        move_direction,
        rotate,
        fire: rng.gen_bool(0.15),
        radar_on: rng.gen_bool(0.1).then(|| rng.gen_bool(0.5)),
        radar_power_delta: None,
        shields_on: rng.gen_bool(0.05).then(|| rng.gen_bool(0.5)),
    }
}
