//! Block-stacking session
//!
//! A piece falls one row every `drop_interval_ms`. Player moves are checked
//! against the board and silently dropped when they collide. A piece that
//! cannot fall any further is locked, full rows are compacted, and the next
//! piece spawns top-center; a spawn that already overlaps ends the run.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Board, Commit, EMPTY, Shape};
use super::input::{InputSnapshot, Key};
use super::pieces::PieceKind;
use super::session::{
    ActiveView, GameEvent, GamePhase, GameSession, Persistable, RenderSnapshot, Renderable,
    Tickable,
};
use crate::consts::{BOARD_HEIGHT, BOARD_WIDTH, DROP_INTERVAL_MS, LINE_CLEAR_POINTS};
use crate::games::GameKind;
use crate::persistence::{RestoreError, SaveState};

/// Board and timing parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetrisConfig {
    pub width: usize,
    pub height: usize,
    pub drop_interval_ms: f64,
}

impl Default for TetrisConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            drop_interval_ms: DROP_INTERVAL_MS,
        }
    }
}

/// The falling piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePiece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub pos: IVec2,
    /// Quarter turns applied since spawn (0..4)
    pub rotation: u8,
}

impl ActivePiece {
    fn cells(&self) -> Vec<IVec2> {
        self.shape.occupied().map(|o| self.pos + o).collect()
    }
}

/// Persisted fields. The in-flight piece's position is not kept: a restored
/// game resumes with the saved piece at the spawn point.
#[derive(Debug, Serialize, Deserialize)]
struct TetrisSave {
    board: Vec<Vec<u8>>,
    #[serde(
        rename = "activePieceId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    active_piece_id: Option<u8>,
    score: u64,
}

#[derive(Debug, Clone)]
pub struct TetrisSession {
    config: TetrisConfig,
    seed: u64,
    rng: Pcg32,
    board: Board,
    active: Option<ActivePiece>,
    score: u64,
    phase: GamePhase,
    /// Milliseconds since the last gravity step
    drop_timer: f64,
    events: Vec<GameEvent>,
}

impl TetrisSession {
    /// New run with a random first piece
    pub fn new(config: TetrisConfig, seed: u64) -> Self {
        let mut session = Self::empty(config, seed);
        let kind = PieceKind::random(&mut session.rng);
        session.spawn(kind);
        session
    }

    /// New run with no piece in play; call [`spawn`](Self::spawn) next
    pub fn empty(config: TetrisConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            board: Board::new(config.width, config.height),
            active: None,
            score: 0,
            phase: GamePhase::Active,
            drop_timer: 0.0,
            events: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    /// Put `kind` at the top-center spawn point. Returns false (and ends the
    /// run) if it overlaps the stack.
    pub fn spawn(&mut self, kind: PieceKind) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        let shape = kind.shape();
        let x = (self.config.width.saturating_sub(shape.width()) / 2) as i32;
        let piece = ActivePiece {
            kind,
            shape,
            pos: IVec2::new(x, 0),
            rotation: 0,
        };
        let blocked = self.board.collides(&piece.shape, piece.pos);
        self.active = Some(piece);
        if blocked {
            log::info!("Spawn of {:?} blocked, game over", kind);
            self.game_over();
            return false;
        }
        true
    }

    /// Shift the active piece; rejected moves leave it untouched
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let target = piece.pos + IVec2::new(dx, dy);
        if self.board.collides(&piece.shape, target) {
            return false;
        }
        piece.pos = target;
        true
    }

    /// Rotate clockwise in place, or keep the old orientation if it collides
    pub fn rotate(&mut self) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        match self.board.try_rotate(&piece.shape, piece.pos) {
            Some(rotated) => {
                piece.shape = rotated;
                piece.rotation = (piece.rotation + 1) % 4;
                true
            }
            None => false,
        }
    }

    /// Drop straight down and lock
    pub fn hard_drop(&mut self) {
        while self.try_move(0, 1) {}
        self.lock_active();
    }

    /// Burn the active piece into the board, clear rows, spawn the next one
    pub fn lock_active(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        let Some(piece) = self.active.take() else {
            return;
        };
        let token = piece.kind.token();
        let outcome = self.board.commit(&piece.shape, piece.pos, token);
        self.events.push(GameEvent::PieceLocked { token });
        log::debug!("Locked {:?} at ({}, {})", piece.kind, piece.pos.x, piece.pos.y);

        if outcome == Commit::TopOut {
            log::info!("Piece locked above the board, game over");
            self.game_over();
            return;
        }

        let rows = self.board.compact_rows();
        if rows > 0 {
            self.score += u64::from(rows) * LINE_CLEAR_POINTS;
            self.events.push(GameEvent::LinesCleared {
                rows,
                score: self.score,
            });
            log::debug!("Cleared {} rows, score {}", rows, self.score);
        }

        let next = PieceKind::random(&mut self.rng);
        self.spawn(next);
    }

    /// One gravity step: fall a row, or lock if blocked
    fn step_down(&mut self) {
        if !self.try_move(0, 1) {
            self.lock_active();
        }
    }

    fn game_over(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver { score: self.score });
    }

    fn restore(&mut self, state: &SaveState) -> Result<(), RestoreError> {
        let save: TetrisSave = state.to_fields()?;
        let board = validate_board(save.board, self.config.width, self.config.height)?;
        let kind = match save.active_piece_id {
            Some(id) => Some(PieceKind::from_token(id).ok_or(RestoreError::UnknownPiece(id))?),
            None => None,
        };

        self.board = board;
        self.score = save.score;
        self.phase = GamePhase::Active;
        self.drop_timer = 0.0;
        self.active = None;
        self.events.clear();
        let kind = kind.unwrap_or_else(|| PieceKind::random(&mut self.rng));
        self.spawn(kind);
        Ok(())
    }
}

/// Check dimensions and tokens before any of it touches the board
fn validate_board(rows: Vec<Vec<u8>>, width: usize, height: usize) -> Result<Board, RestoreError> {
    let ragged = rows.iter().find(|r| r.len() != width).map(|r| r.len());
    if rows.len() != height || ragged.is_some() {
        return Err(RestoreError::Dimensions {
            width,
            height,
            found_width: ragged.unwrap_or(width),
            found_height: rows.len(),
        });
    }
    for (y, row) in rows.iter().enumerate() {
        for (x, &value) in row.iter().enumerate() {
            if value != EMPTY && PieceKind::from_token(value).is_none() {
                return Err(RestoreError::InvalidCell { x, y, value });
            }
        }
    }
    Board::from_rows(width, height, rows).ok_or(RestoreError::Dimensions {
        width,
        height,
        found_width: width,
        found_height: height,
    })
}

impl Tickable for TetrisSession {
    fn tick(&mut self, input: &InputSnapshot, dt: f64) {
        if self.phase == GamePhase::GameOver {
            return;
        }

        for key in input.presses() {
            match key {
                Key::Left => {
                    self.try_move(-1, 0);
                }
                Key::Right => {
                    self.try_move(1, 0);
                }
                Key::Down => {
                    self.try_move(0, 1);
                }
                Key::Up => {
                    self.rotate();
                }
                Key::Space => self.hard_drop(),
            }
            if self.phase == GamePhase::GameOver {
                return;
            }
        }

        self.drop_timer += dt;
        if self.drop_timer > self.config.drop_interval_ms {
            self.step_down();
            self.drop_timer = 0.0;
        }
    }

    fn is_terminal(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

impl Renderable for TetrisSession {
    fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            game: GameKind::Tetris,
            width: self.board.width(),
            height: self.board.height(),
            cells: self.board.rows().concat(),
            active: self.active.as_ref().map(|p| ActiveView {
                cells: p.cells(),
                anchor: p.pos,
                token: p.kind.token(),
            }),
            score: self.score,
            phase: self.phase,
        }
    }
}

impl Persistable for TetrisSession {
    fn save(&self) -> SaveState {
        let fields = TetrisSave {
            board: self.board.rows().to_vec(),
            active_piece_id: self.active.as_ref().map(|p| p.kind.token()),
            score: self.score,
        };
        SaveState::from_fields(&fields).unwrap_or_default()
    }

    fn load(&mut self, state: &SaveState) -> Result<(), RestoreError> {
        self.restore(state).inspect_err(|_| {
            *self = Self::new(self.config, self.seed);
        })
    }
}

impl GameSession for TetrisSession {
    fn kind(&self) -> GameKind {
        GameKind::Tetris
    }

    fn score(&self) -> u64 {
        self.score
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::{EdgeKind, KeyEdge};
    use serde_json::json;

    fn session_with(kind: PieceKind) -> TetrisSession {
        let mut session = TetrisSession::empty(TetrisConfig::default(), 42);
        assert!(session.spawn(kind));
        session
    }

    fn press(keys: &[Key]) -> InputSnapshot {
        InputSnapshot {
            held: Default::default(),
            edges: keys
                .iter()
                .map(|&key| KeyEdge {
                    key,
                    kind: EdgeKind::Pressed,
                })
                .collect(),
        }
    }

    fn fill_row(session: &mut TetrisSession, y: i32, except: &[i32]) {
        let bar = Shape::from_rows(&[&[1]]);
        for x in 0..session.config.width as i32 {
            if !except.contains(&x) {
                session.board.commit(&bar, IVec2::new(x, y), 2);
            }
        }
    }

    #[test]
    fn test_i_piece_falls_to_floor() {
        let mut session = session_with(PieceKind::I);
        assert_eq!(session.active().unwrap().pos, IVec2::new(3, 0));

        while session.try_move(0, 1) {}
        assert_eq!(session.active().unwrap().pos, IVec2::new(3, 19));
        session.lock_active();

        let board = session.board();
        for x in 0..10 {
            let expected = (3..=6).contains(&x);
            assert_eq!(board.is_occupied(x, 19), expected, "x = {x}");
        }
        assert_eq!(board.filled_count(), 4);
        assert_eq!(session.phase(), GamePhase::Active);
        assert!(session.active().is_some());
    }

    #[test]
    fn test_gravity_locks_after_interval() {
        let mut session = session_with(PieceKind::O);
        let idle = InputSnapshot::default();

        // Reaching the interval exactly is not enough
        for _ in 0..10 {
            session.tick(&idle, 100.0);
        }
        assert_eq!(session.active().unwrap().pos.y, 0);

        session.tick(&idle, 100.0);
        assert_eq!(session.active().unwrap().pos.y, 1);
        assert_eq!(session.drop_timer, 0.0);
    }

    #[test]
    fn test_moves_rejected_at_wall() {
        let mut session = session_with(PieceKind::O);
        for _ in 0..10 {
            session.tick(&press(&[Key::Left]), 0.0);
        }
        assert_eq!(session.active().unwrap().pos.x, 0);
        for _ in 0..10 {
            session.tick(&press(&[Key::Right]), 0.0);
        }
        assert_eq!(session.active().unwrap().pos.x, 8);
    }

    #[test]
    fn test_rotation_rejected_keeps_orientation() {
        let mut session = session_with(PieceKind::I);
        assert!(session.rotate());
        let upright = session.active().unwrap().shape.clone();
        assert_eq!(upright.height(), 4);

        // Push the upright bar into the right wall, rotating back would overflow
        while session.try_move(1, 0) {}
        assert_eq!(session.active().unwrap().pos.x, 9);
        assert!(!session.rotate());
        assert_eq!(session.active().unwrap().shape, upright);
        assert_eq!(session.active().unwrap().rotation, 1);
    }

    #[test]
    fn test_hard_drop_clears_line_and_scores() {
        let mut session = session_with(PieceKind::I);
        fill_row(&mut session, 19, &[3, 4, 5, 6]);

        session.tick(&press(&[Key::Space]), 0.0);
        assert_eq!(session.score(), LINE_CLEAR_POINTS);
        assert_eq!(session.board().filled_count(), 0);

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::LinesCleared {
            rows: 1,
            score: LINE_CLEAR_POINTS
        }));
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_double_clear_scores_each_row() {
        let mut session = session_with(PieceKind::O);
        fill_row(&mut session, 19, &[4, 5]);
        fill_row(&mut session, 18, &[4, 5]);
        session.hard_drop();
        assert_eq!(session.score(), 2 * LINE_CLEAR_POINTS);
        assert_eq!(session.board().filled_count(), 0);
    }

    #[test]
    fn test_blocked_spawn_is_game_over() {
        let mut session = TetrisSession::empty(TetrisConfig::default(), 1);
        fill_row(&mut session, 0, &[]);
        assert!(!session.spawn(PieceKind::T));
        assert!(session.is_terminal());
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::GameOver { score: 0 }]
        );
    }

    #[test]
    fn test_game_over_freezes_board() {
        let mut session = TetrisSession::empty(TetrisConfig::default(), 1);
        fill_row(&mut session, 2, &[0]);
        assert!(session.spawn(PieceKind::O));
        // Locks in the top rows; every next piece overlaps it
        session.hard_drop();
        assert!(session.is_terminal());

        let frozen = session.board().clone();
        session.tick(&press(&[Key::Left, Key::Space]), 5000.0);
        assert_eq!(session.board(), &frozen);
        // Final snapshot is still available
        assert_eq!(session.snapshot().phase, GamePhase::GameOver);
    }

    #[test]
    fn test_snapshot_overlays_active_piece() {
        let session = session_with(PieceKind::T);
        let snap = session.snapshot();
        assert_eq!(snap.width, 10);
        assert_eq!(snap.height, 20);
        assert_eq!(snap.cell(4, 0), 0);
        assert_eq!(snap.composed(4, 0), PieceKind::T.token());
        assert_eq!(snap.composed(3, 1), PieceKind::T.token());
        assert_eq!(snap.composed(3, 0), 0);
    }

    #[test]
    fn test_save_and_restore_between_pieces() {
        let mut session = session_with(PieceKind::L);
        fill_row(&mut session, 19, &[0]);
        session.score = 700;

        let saved = session.save();
        assert_eq!(saved.get("score"), Some(&json!(700)));
        assert_eq!(saved.get("activePieceId"), Some(&json!(PieceKind::L.token())));

        let mut restored = TetrisSession::new(TetrisConfig::default(), 9);
        restored.load(&saved).unwrap();
        assert_eq!(restored.score(), 700);
        assert_eq!(restored.board(), session.board());
        let piece = restored.active().unwrap();
        assert_eq!(piece.kind, PieceKind::L);
        assert_eq!(piece.pos, IVec2::new(3, 0));
    }

    #[test]
    fn test_malformed_restore_falls_back_to_fresh() {
        let mut session = session_with(PieceKind::S);
        session.score = 300;

        let mut bad = session.save();
        bad.insert("board", json!([[1, 2, 3]]));
        let err = session.load(&bad).unwrap_err();
        assert!(matches!(err, RestoreError::Dimensions { found_height: 1, .. }));
        assert_eq!(session.score(), 0);
        assert_eq!(session.board().filled_count(), 0);
        assert_eq!(session.phase(), GamePhase::Active);

        let mut bad = session.save();
        let mut rows = vec![vec![0u8; 10]; 20];
        rows[5][5] = 42;
        bad.insert("board", json!(rows));
        assert!(matches!(
            session.load(&bad),
            Err(RestoreError::InvalidCell { x: 5, y: 5, value: 42 })
        ));

        let mut bad = session.save();
        bad.insert("activePieceId", json!(9));
        assert!(matches!(session.load(&bad), Err(RestoreError::UnknownPiece(9))));

        let mut bad = session.save();
        bad.insert("score", json!(-5));
        assert!(matches!(session.load(&bad), Err(RestoreError::Schema(_))));
    }
}
