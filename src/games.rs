//! Game registry
//!
//! Lists the games the hub can launch and builds the matching session.
//! Which implementation runs is decided here, once, at construction time.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{GameSession, SnakeConfig, SnakeSession, TetrisConfig, TetrisSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Snake,
    Tetris,
}

impl GameKind {
    pub const ALL: [GameKind; 2] = [GameKind::Snake, GameKind::Tetris];

    /// Stable id used for storage keys and score reports
    pub fn id(&self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::Tetris => "tetris",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.to_lowercase();
        Self::ALL.into_iter().find(|g| g.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameKind::Snake => "Classic Snake",
            GameKind::Tetris => "Tetris",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GameKind::Snake => "Retro snake game",
            GameKind::Tetris => "Block stacking puzzle",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        &["2d", "classic"]
    }

    /// Persistence key for this game's save state
    pub fn storage_key(&self) -> String {
        format!("gamestate_{}", self.id())
    }

    /// Simulation rate configured for this game
    pub fn tick_hz(&self, settings: &Settings) -> u32 {
        match self {
            GameKind::Snake => settings.snake_tick_hz,
            GameKind::Tetris => settings.tetris_tick_hz,
        }
    }

    /// Build a fresh session
    pub fn create_session(&self, settings: &Settings, seed: u64) -> Box<dyn GameSession> {
        match self {
            GameKind::Snake => Box::new(SnakeSession::new(
                SnakeConfig {
                    width: settings.snake_tiles,
                    height: settings.snake_tiles,
                    ..SnakeConfig::default()
                },
                seed,
            )),
            GameKind::Tetris => Box::new(TetrisSession::new(
                TetrisConfig {
                    width: settings.board_width,
                    height: settings.board_height,
                    drop_interval_ms: settings.drop_interval_ms,
                },
                seed,
            )),
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
