//! Horde Rush - A lane-based endless runner with a growing crowd
//!
//! Core modules:
//! - `sim`: Deterministic simulation (scrolling, spawning, collisions, crowd)
//! - `session`: Host-facing game session and game-over flow
//! - `highscores`: High score persistence behind a store trait
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod session;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScoreFile, HighScores, MemoryScoreStore, ScoreStore};
pub use session::GameSession;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of spawn lanes
    pub const LANE_COUNT: usize = 3;
    /// Spawn rows appear this far above the visible top edge
    pub const SPAWN_MARGIN: f32 = 100.0;
    /// Leader sits this far above the bottom edge (plus its own height)
    pub const PLAYER_BOTTOM_MARGIN: f32 = 50.0;
    /// Number of background tiles in the scroll ring
    pub const BACKGROUND_TILE_COUNT: usize = 2;
}
