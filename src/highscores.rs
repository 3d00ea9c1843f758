//! High score leaderboard and player stats
//!
//! Persisted to LocalStorage, tracks the top 10 scores per game plus
//! lifetime totals. Acts as the hub's score sink.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::games::GameKind;
use crate::platform::{ScoreReport, ScoreSink};

/// Maximum number of high scores to keep per game
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score
    pub score: u64,
    /// Host timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Lifetime totals across all games
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games_played: u64,
    pub total_score: u64,
}

/// Per-game leaderboards
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    #[serde(default)]
    pub boards: BTreeMap<GameKind, Vec<HighScoreEntry>>,
    #[serde(default)]
    pub stats: PlayerStats,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_hub_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, game: GameKind) -> &[HighScoreEntry] {
        self.boards.get(&game).map_or(&[], Vec::as_slice)
    }

    /// Check if a score qualifies for the game's leaderboard
    pub fn qualifies(&self, game: GameKind, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let entries = self.entries(game);
        if entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, game: GameKind, score: u64, timestamp: f64) -> Option<usize> {
        if !self.qualifies(game, score) {
            return None;
        }

        let entries = self.boards.entry(game).or_default();
        let entry = HighScoreEntry { score, timestamp };

        // Find insertion point (sorted descending by score)
        let rank = match entries.iter().position(|e| score > e.score) {
            Some(i) => {
                entries.insert(i, entry);
                i + 1
            }
            None => {
                entries.push(entry);
                entries.len()
            }
        };

        entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    /// Get the top score for a game (if any)
    pub fn top_score(&self, game: GameKind) -> Option<u64> {
        self.entries(game).first().map(|e| e.score)
    }

    /// Count a finished game and file its score
    pub fn record(&mut self, report: &ScoreReport) -> Option<usize> {
        self.stats.games_played += 1;
        self.stats.total_score += report.score;
        self.add_score(report.game, report.score, report.timestamp)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded high scores ({} games played)", scores.stats.games_played);
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ScoreSink for HighScores {
    fn report(&mut self, report: ScoreReport) {
        match self.record(&report) {
            Some(rank) => log::info!("New {} high score {} (rank {})", report.game, report.score, rank),
            None => log::info!("{} finished with {}", report.game, report.score),
        }
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(GameKind::Snake, 0));
        assert!(scores.qualifies(GameKind::Snake, 1));
    }

    #[test]
    fn test_ranks_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(GameKind::Tetris, 300, 1.0), Some(1));
        assert_eq!(scores.add_score(GameKind::Tetris, 500, 2.0), Some(1));
        assert_eq!(scores.add_score(GameKind::Tetris, 400, 3.0), Some(2));
        let listed: Vec<u64> = scores.entries(GameKind::Tetris).iter().map(|e| e.score).collect();
        assert_eq!(listed, vec![500, 400, 300]);
        assert_eq!(scores.top_score(GameKind::Tetris), Some(500));
        // Boards are per game
        assert_eq!(scores.top_score(GameKind::Snake), None);
    }

    #[test]
    fn test_board_is_capped() {
        let mut scores = HighScores::new();
        for s in 1..=15 {
            scores.add_score(GameKind::Snake, s, s as f64);
        }
        assert_eq!(scores.entries(GameKind::Snake).len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(GameKind::Snake, 6));
        assert_eq!(scores.add_score(GameKind::Snake, 6, 0.0), None);
        assert_eq!(scores.add_score(GameKind::Snake, 7, 0.0), Some(10));
    }

    #[test]
    fn test_report_updates_stats() {
        let mut scores = HighScores::new();
        scores.report(ScoreReport {
            game: GameKind::Snake,
            score: 0,
            timestamp: 10.0,
        });
        scores.report(ScoreReport {
            game: GameKind::Tetris,
            score: 200,
            timestamp: 20.0,
        });
        assert_eq!(
            scores.stats,
            PlayerStats {
                games_played: 2,
                total_score: 200
            }
        );
        assert!(scores.entries(GameKind::Snake).is_empty());
        assert_eq!(scores.top_score(GameKind::Tetris), Some(200));
    }
}
