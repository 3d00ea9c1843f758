//! Hub settings
//!
//! Read from LocalStorage (web) or from the JSON file named by
//! `ARCADE_HUB_SETTINGS` (native). Hand-built values go through
//! [`Settings::sanitized`] before the host uses them.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Environment variable pointing at a settings JSON file (native only)
pub const SETTINGS_ENV_VAR: &str = "ARCADE_HUB_SETTINGS";

/// Largest board or arena side accepted from settings
pub const MAX_GRID_SIDE: usize = 100;

/// Timing and board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Tetris simulation rate (ticks per second)
    pub tetris_tick_hz: u32,
    /// Snake simulation rate; the snake moves one cell per tick
    pub snake_tick_hz: u32,
    /// Upper bound on catch-up ticks per frame
    pub max_ticks_per_advance: u32,
    /// Gravity step for the falling piece (ms)
    pub drop_interval_ms: f64,
    /// How long a finished game stays on screen before teardown (ms)
    pub game_over_delay_ms: f64,

    // === Boards ===
    pub board_width: usize,
    pub board_height: usize,
    /// Snake arena side length in tiles
    pub snake_tiles: usize,

    /// Fixed RNG seed; None picks one per launch
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tetris_tick_hz: TICK_HZ,
            snake_tick_hz: SNAKE_TICK_HZ,
            max_ticks_per_advance: MAX_TICKS_PER_ADVANCE,
            drop_interval_ms: DROP_INTERVAL_MS,
            game_over_delay_ms: GAME_OVER_DELAY_MS,

            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            snake_tiles: SNAKE_TILES,

            seed: None,
        }
    }
}

impl Settings {
    /// Parse settings JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::sanitized)
    }

    /// Replace values the simulation cannot run with by their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.tetris_tick_hz == 0 {
            self.tetris_tick_hz = defaults.tetris_tick_hz;
        }
        if self.snake_tick_hz == 0 {
            self.snake_tick_hz = defaults.snake_tick_hz;
        }
        if self.max_ticks_per_advance == 0 {
            self.max_ticks_per_advance = defaults.max_ticks_per_advance;
        }
        if !(self.drop_interval_ms.is_finite() && self.drop_interval_ms > 0.0) {
            self.drop_interval_ms = defaults.drop_interval_ms;
        }
        if !(self.game_over_delay_ms.is_finite() && self.game_over_delay_ms >= 0.0) {
            self.game_over_delay_ms = defaults.game_over_delay_ms;
        }
        // Pieces are up to 4 wide and must spawn inside the board
        let side_ok = |n: usize| (4..=MAX_GRID_SIDE).contains(&n);
        if !side_ok(self.board_width) || !side_ok(self.board_height) {
            self.board_width = defaults.board_width;
            self.board_height = defaults.board_height;
        }
        let (sx, sy) = SNAKE_START;
        if self.snake_tiles <= sx.max(sy) as usize || self.snake_tiles > MAX_GRID_SIDE {
            self.snake_tiles = defaults.snake_tiles;
        }
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_hub_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from the file named by `ARCADE_HUB_SETTINGS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(SETTINGS_ENV_VAR) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read settings file {}: {}", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "snake_tick_hz": 15, "seed": 99 }"#).unwrap();
        assert_eq!(settings.snake_tick_hz, 15);
        assert_eq!(settings.seed, Some(99));
        assert_eq!(settings.board_width, BOARD_WIDTH);
        assert_eq!(settings.max_ticks_per_advance, MAX_TICKS_PER_ADVANCE);
    }

    #[test]
    fn test_sanitize_rejects_unusable_values() {
        let settings = Settings::from_json(
            r#"{ "tetris_tick_hz": 0, "max_ticks_per_advance": 0, "drop_interval_ms": -1.0, "board_width": 2, "snake_tiles": 5 }"#,
        )
        .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_sanitize_caps_grid_sides() {
        let settings = Settings {
            board_height: 5000,
            snake_tiles: 1_000_000,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(settings.board_height, BOARD_HEIGHT);
        assert_eq!(settings.snake_tiles, SNAKE_TILES);

        let edge = Settings {
            board_width: MAX_GRID_SIDE,
            snake_tiles: MAX_GRID_SIDE,
            ..Settings::default()
        };
        assert_eq!(edge.clone().sanitized(), edge);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(Settings::from_json("{ nope").is_err());
        assert!(Settings::from_json(r#"{ "board_width": "wide" }"#).is_err());
    }
}
