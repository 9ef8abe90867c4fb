pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use rng::RandomSource;
