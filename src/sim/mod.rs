//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (driven by `crate::scheduler`)
//! - Seeded RNG only
//! - Input arrives as a per-tick snapshot, never as raw events
//! - No rendering or platform dependencies

pub mod grid;
pub mod input;
pub mod pieces;
pub mod session;
pub mod snake;
pub mod tetris;

pub use grid::{Board, Commit, EMPTY, GridSize, Shape};
pub use input::{EdgeKind, InputBuffer, InputSnapshot, Key, KeyEdge};
pub use pieces::PieceKind;
pub use session::{
    ActiveView, GameEvent, GamePhase, GameSession, Persistable, RenderSnapshot, Renderable,
    Tickable,
};
pub use snake::{SnakeConfig, SnakeSession};
pub use tetris::{ActivePiece, TetrisConfig, TetrisSession};
