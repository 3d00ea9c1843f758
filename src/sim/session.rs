//! Capabilities every game session provides to the host
//!
//! A session is ticked by the scheduler, viewed by the render sink and
//! saved/restored by the persistence sink. Concrete games implement the
//! traits directly; the host only ever sees `dyn GameSession`.

use glam::IVec2;

use super::input::InputSnapshot;
use crate::games::GameKind;
use crate::persistence::{RestoreError, SaveState};

/// Coarse lifecycle shared by all games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the first input (no motion yet)
    Idle,
    /// Simulation running
    Active,
    /// Run ended; state is frozen
    GameOver,
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A piece was burned into the board
    PieceLocked { token: u8 },
    /// Rows were compacted away
    LinesCleared { rows: u32, score: u64 },
    /// Snake reached the food
    FoodEaten { score: u64 },
    /// Terminal transition, emitted once
    GameOver { score: u64 },
}

/// The falling piece as the renderer should draw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveView {
    /// Absolute board cells, may include rows above the board
    pub cells: Vec<IVec2>,
    pub anchor: IVec2,
    pub token: u8,
}

/// Owned, read-only frame handed to a render sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSnapshot {
    pub game: GameKind,
    pub width: usize,
    pub height: usize,
    /// Row-major cell tokens, `0` = empty
    pub cells: Vec<u8>,
    pub active: Option<ActiveView>,
    pub score: u64,
    pub phase: GamePhase,
}

impl RenderSnapshot {
    /// Board token at `(x, y)` ignoring the active piece
    pub fn cell(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            0
        }
    }

    /// Token with the active piece drawn over the board
    pub fn composed(&self, x: usize, y: usize) -> u8 {
        if let Some(active) = &self.active {
            let here = IVec2::new(x as i32, y as i32);
            if active.cells.contains(&here) {
                return active.token;
            }
        }
        self.cell(x, y)
    }
}

/// Advances one fixed step
pub trait Tickable {
    /// `dt` is the fixed tick interval in milliseconds
    fn tick(&mut self, input: &InputSnapshot, dt: f64);

    fn is_terminal(&self) -> bool;
}

pub trait Renderable {
    fn snapshot(&self) -> RenderSnapshot;
}

pub trait Persistable {
    fn save(&self) -> SaveState;

    /// Install a saved state. Invalid data leaves the session as a fresh
    /// game and is reported as an error.
    fn load(&mut self, state: &SaveState) -> Result<(), RestoreError>;
}

/// Everything the host needs from a running game
pub trait GameSession: Tickable + Renderable + Persistable {
    fn kind(&self) -> GameKind;

    fn score(&self) -> u64;

    fn phase(&self) -> GamePhase;

    /// Events since the last drain, oldest first
    fn drain_events(&mut self) -> Vec<GameEvent>;
}
