//! Host shell
//!
//! Owns at most one running session. Each host frame drives the scheduler,
//! which pulls one input snapshot per tick; afterwards the session's events
//! are forwarded (game over → score sink) and a frame goes to the renderer.
//! A finished game stays on screen for `game_over_delay_ms`, then the host
//! tears it down on its own.

use std::ops::ControlFlow;

use super::{PersistenceSink, RenderSink, ScoreReport, ScoreSink};
use crate::games::GameKind;
use crate::scheduler::Scheduler;
use crate::settings::Settings;
use crate::sim::{GameEvent, GameSession, InputBuffer};

/// Collaborators handed to the host at construction
pub struct HostContext {
    pub renderer: Box<dyn RenderSink>,
    pub storage: Box<dyn PersistenceSink>,
    pub scores: Box<dyn ScoreSink>,
    pub settings: Settings,
}

/// What a host frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No session is running
    Idle,
    /// Session still playing
    Running { ticks: u32 },
    /// Session finished, waiting out the teardown delay
    GameOver { score: u64 },
    /// Session was torn down during this frame
    Closed { game: GameKind, score: u64 },
}

struct RunningSession {
    session: Box<dyn GameSession>,
    scheduler: Scheduler,
    /// Host time of the game-over transition
    game_over_at: Option<f64>,
}

pub struct HostShell {
    ctx: HostContext,
    input: InputBuffer,
    running: Option<RunningSession>,
}

impl HostShell {
    pub fn new(mut ctx: HostContext) -> Self {
        ctx.settings = ctx.settings.sanitized();
        Self {
            ctx,
            input: InputBuffer::new(),
            running: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.ctx.settings
    }

    pub fn session(&self) -> Option<&dyn GameSession> {
        self.running.as_ref().map(|r| &*r.session)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start a fresh game, replacing any current one
    pub fn launch(&mut self, game: GameKind, seed: u64) {
        self.destroy();
        let settings = &self.ctx.settings;
        let session = game.create_session(settings, seed);
        let scheduler = Scheduler::with_rate(game.tick_hz(settings), settings.max_ticks_per_advance);
        log::info!(
            "Launching {} (seed {}, {} Hz)",
            game.name(),
            seed,
            game.tick_hz(settings)
        );
        self.input.clear();
        self.running = Some(RunningSession {
            session,
            scheduler,
            game_over_at: None,
        });
    }

    /// Launch and install the stored save, if there is a usable one.
    /// Returns true when a save was restored.
    pub fn resume(&mut self, game: GameKind, seed: u64) -> bool {
        self.launch(game, seed);
        let key = game.storage_key();
        let Some(state) = self.ctx.storage.fetch(&key) else {
            return false;
        };
        let Some(running) = self.running.as_mut() else {
            return false;
        };
        match running.session.load(&state) {
            Ok(()) => {
                log::info!("Resumed {} at score {}", game.name(), running.session.score());
                true
            }
            Err(e) => {
                log::warn!("Rejected saved {} state, starting fresh: {}", game.name(), e);
                self.ctx.storage.clear(&key);
                false
            }
        }
    }

    pub fn on_key_down(&mut self, code: &str) {
        self.input.on_key_down(code);
    }

    pub fn on_key_up(&mut self, code: &str) {
        self.input.on_key_up(code);
    }

    /// One host callback at time `now` (ms)
    pub fn frame(&mut self, now: f64) -> FrameOutcome {
        let Some(running) = self.running.as_mut() else {
            return FrameOutcome::Idle;
        };
        let RunningSession {
            session,
            scheduler,
            game_over_at,
        } = running;

        let input = &mut self.input;
        let ticks = scheduler.advance(now, |dt| {
            let snapshot = input.snapshot_for_tick();
            session.tick(&snapshot, dt);
            if session.is_terminal() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        for event in session.drain_events() {
            if let GameEvent::GameOver { score } = event {
                log::info!("{} over with score {}", session.kind().name(), score);
                *game_over_at = Some(now);
                self.ctx.scores.report(ScoreReport {
                    game: session.kind(),
                    score,
                    timestamp: now,
                });
            }
        }

        self.ctx.renderer.render(&session.snapshot());

        let Some(ended) = *game_over_at else {
            return FrameOutcome::Running { ticks };
        };
        let game = session.kind();
        let score = session.score();
        if now - ended >= self.ctx.settings.game_over_delay_ms {
            self.destroy();
            FrameOutcome::Closed { game, score }
        } else {
            FrameOutcome::GameOver { score }
        }
    }

    /// Tear down the running session, persisting it if it is still live.
    /// Safe to call any number of times.
    pub fn destroy(&mut self) {
        let Some(mut running) = self.running.take() else {
            return;
        };
        running.scheduler.stop();
        let game = running.session.kind();
        let key = game.storage_key();
        if running.session.is_terminal() {
            self.ctx.storage.clear(&key);
        } else {
            self.ctx.storage.store(&key, &running.session.save());
        }
        self.input.clear();
        log::info!("Closed {}", game.name());
    }
}

impl Drop for HostShell {
    fn drop(&mut self) {
        self.destroy();
    }
}
