//! Platform abstraction layer
//!
//! The simulation never reaches for globals: everything outside it
//! (drawing, storage, the leaderboard) is an injected collaborator.
//! - `host`: owns the running session, the scheduler and the input buffer
//! - `storage`: persistence backends (in-memory, LocalStorage on web)

pub mod host;
pub mod storage;

pub use host::{FrameOutcome, HostContext, HostShell};
pub use storage::MemoryStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

use std::cell::RefCell;
use std::rc::Rc;

use crate::games::GameKind;
use crate::persistence::SaveState;
use crate::sim::RenderSnapshot;

/// Receives a frame after every host update
pub trait RenderSink {
    fn render(&mut self, frame: &RenderSnapshot);
}

/// Key-value store for session saves
pub trait PersistenceSink {
    fn store(&mut self, key: &str, state: &SaveState);

    fn fetch(&self, key: &str) -> Option<SaveState>;

    fn clear(&mut self, key: &str);
}

/// Final result of a finished session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreReport {
    pub game: GameKind,
    pub score: u64,
    /// Host timestamp (ms) of the game-over transition
    pub timestamp: f64,
}

/// Fire-and-forget leaderboard/stats collaborator
pub trait ScoreSink {
    fn report(&mut self, report: ScoreReport);
}

/// Render sink that drops every frame
#[derive(Debug, Default)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn render(&mut self, _frame: &RenderSnapshot) {}
}

// Shared handles, so the embedding app can read a sink the host also writes to

impl<T: RenderSink> RenderSink for Rc<RefCell<T>> {
    fn render(&mut self, frame: &RenderSnapshot) {
        self.borrow_mut().render(frame);
    }
}

impl<T: PersistenceSink> PersistenceSink for Rc<RefCell<T>> {
    fn store(&mut self, key: &str, state: &SaveState) {
        self.borrow_mut().store(key, state);
    }

    fn fetch(&self, key: &str) -> Option<SaveState> {
        self.borrow().fetch(key)
    }

    fn clear(&mut self, key: &str) {
        self.borrow_mut().clear(key);
    }
}

impl<T: ScoreSink> ScoreSink for Rc<RefCell<T>> {
    fn report(&mut self, report: ScoreReport) {
        self.borrow_mut().report(report);
    }
}
