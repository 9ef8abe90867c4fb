//! Engine configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

/// Configuration for one simulation instance
///
/// These values have been tuned to produce reasonable pacing on maps around
/// 15x15 to 30x30. Changing them shifts the balance between aggression,
/// survival, and resource control.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // === AGENT VITALS ===
    /// Health a tank spawns and resurrects with
    ///
    /// At the default missile damage (400), a fresh tank survives two hits
    /// and dies to the third.
    pub max_health: u32,

    /// Energy a tank spawns and resurrects with
    ///
    /// Energy pays for radar and shield upkeep and for shield absorption.
    /// A tank running everything at once drains in roughly 25 turns.
    pub max_energy: u32,

    /// Ammunition a tank spawns and resurrects with
    pub initial_ammo: u32,

    // === MISSILES ===
    /// Health removed by one unshielded missile hit
    pub missile_damage: u32,

    /// Turns a missile may fly before it expires mid-air
    ///
    /// Bounds missile travel on open maps; on bordered maps missiles
    /// usually strike a wall first.
    pub missile_lifetime: u32,

    // === RADAR ===
    /// Upper bound on the radar range setting
    pub radar_range_max: u32,

    /// Radar range setting a tank starts with
    pub radar_range_default: u32,

    // === PASSIVE SENSES ===
    /// Maximum Manhattan distance at which another tank can be smelled
    pub smell_range: usize,

    /// Maximum Manhattan distance at which a moving tank can be heard
    ///
    /// Kept below smell_range so sound carries strictly less information
    /// at long distance.
    pub hearing_range: usize,

    // === RESOURCES ===
    /// Maximum number of ammunition buckets on the grid at once
    pub max_ammo_buckets: u32,

    /// Ammunition gained from picking up one bucket
    pub ammo_bucket_refill: u32,

    /// Spawn period scale for ammunition buckets
    ///
    /// Each turn below the bucket cap, a bucket spawns with probability
    /// `turns_since_last_spawn / ammo_spawn_period`. Larger values mean
    /// rarer buckets.
    pub ammo_spawn_period: f64,

    /// Energy restored per turn spent resting on an energy recharge square
    pub energy_recharge: u32,

    /// Health restored per turn spent resting on a health recharge square
    pub health_recharge: u32,

    // === ENERGY ECONOMY ===
    /// Energy drained per turn while shields are raised
    pub shield_energy_cost: u32,

    /// Energy drained when shields absorb a missile hit
    ///
    /// Cheaper than the health cost of a hit, but only while energy lasts;
    /// a tank that cannot pay has its shield collapse and takes the hit.
    pub shield_absorb_cost: u32,

    // === PLACEMENT ===
    /// Attempts made when sampling for a random empty cell
    ///
    /// The search returns a typed no-space error once exhausted; callers
    /// defer the placement to a later turn instead of looping forever.
    pub empty_cell_attempts: u32,

    // === VICTORY ===
    /// Points awarded to a missile's owner for destroying another tank
    pub kill_score: u32,

    /// Score at which the game ends
    pub win_score: u32,

    /// Optional hard turn limit; `None` plays until win_score is reached
    pub max_turns: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_health: 1000,
            max_energy: 1000,
            initial_ammo: 15,
            missile_damage: 400,
            missile_lifetime: 50,
            radar_range_max: 14,
            radar_range_default: 3,
            smell_range: 10,
            hearing_range: 7,
            max_ammo_buckets: 3,
            ammo_bucket_refill: 7,
            ammo_spawn_period: 60.0,
            energy_recharge: 250,
            health_recharge: 150,
            shield_energy_cost: 20,
            shield_absorb_cost: 250,
            empty_cell_attempts: 128,
            kill_score: 2,
            win_score: 50,
            max_turns: None,
        }
    }
}
