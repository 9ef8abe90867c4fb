pub mod agent;
pub mod grid;
pub mod projectile;

pub use agent::{Agent, HitOutcome};
pub use grid::{Grid, MapTile, Occupant, Terrain};
pub use projectile::Missile;
