//! Arcade Hub - classic grid games on a fixed-timestep core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid engine, input buffer, game sessions)
//! - `scheduler`: Fixed-timestep accumulator with catch-up cap
//! - `platform`: Host shell plus render/persistence/score collaborators
//! - `renderer`: Text rendering of session snapshots
//! - `persistence`: Save state schema and restore errors
//! - `games`: Registry of launchable games

pub mod games;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use games::GameKind;
pub use highscores::HighScores;
pub use platform::{FrameOutcome, HostContext, HostShell};
pub use scheduler::Scheduler;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Simulation rate for drop sessions (60 Hz)
    pub const TICK_HZ: u32 = 60;
    /// Snake moves one cell per tick
    pub const SNAKE_TICK_HZ: u32 = 10;
    /// Maximum catch-up ticks per host frame to prevent spiral of death
    pub const MAX_TICKS_PER_ADVANCE: u32 = 5;

    /// Tetris board
    pub const BOARD_WIDTH: usize = 10;
    pub const BOARD_HEIGHT: usize = 20;
    /// Gravity step (ms)
    pub const DROP_INTERVAL_MS: f64 = 1000.0;
    /// Points per cleared row
    pub const LINE_CLEAR_POINTS: u64 = 100;

    /// Snake arena is SNAKE_TILES x SNAKE_TILES
    pub const SNAKE_TILES: usize = 40;
    pub const SNAKE_START: (i32, i32) = (10, 10);

    /// Final board stays up this long before teardown (ms)
    pub const GAME_OVER_DELAY_MS: f64 = 3000.0;
}
