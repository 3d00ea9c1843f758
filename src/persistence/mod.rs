//! Save/load of session state
//!
//! Features:
//! - Field-name → value mapping (`SaveState`), stored as a JSON object
//! - Typed decoding into per-game save structs
//! - Validation errors that make the session fall back to a fresh game

pub mod state;

pub use state::{RestoreError, SaveState};
