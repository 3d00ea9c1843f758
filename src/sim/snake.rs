//! Snake-style grid movement session
//!
//! Lock-step: every tick the head advances one cell along the current
//! velocity. Walls and the body are fatal; food grows the body by one.

use std::collections::VecDeque;

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::GridSize;
use super::input::{InputSnapshot, Key};
use super::session::{
    GameEvent, GamePhase, GameSession, Persistable, RenderSnapshot, Renderable, Tickable,
};
use crate::consts::{SNAKE_START, SNAKE_TILES};
use crate::games::GameKind;
use crate::persistence::{RestoreError, SaveState};

/// Render tokens
pub const HEAD_TOKEN: u8 = 1;
pub const BODY_TOKEN: u8 = 2;
pub const FOOD_TOKEN: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnakeConfig {
    pub width: usize,
    pub height: usize,
    pub start: IVec2,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            width: SNAKE_TILES,
            height: SNAKE_TILES,
            start: IVec2::new(SNAKE_START.0, SNAKE_START.1),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SnakeSave {
    #[serde(rename = "bodyCells")]
    body_cells: Vec<IVec2>,
    direction: IVec2,
    score: u64,
}

fn direction_for(key: Key) -> Option<IVec2> {
    match key {
        Key::Up => Some(IVec2::NEG_Y),
        Key::Down => Some(IVec2::Y),
        Key::Left => Some(IVec2::NEG_X),
        Key::Right => Some(IVec2::X),
        Key::Space => None,
    }
}

#[derive(Debug, Clone)]
pub struct SnakeSession {
    config: SnakeConfig,
    seed: u64,
    rng: Pcg32,
    size: GridSize,
    /// Head first
    body: VecDeque<IVec2>,
    velocity: IVec2,
    /// Turn requested since the last move
    pending: Option<IVec2>,
    food: Option<IVec2>,
    score: u64,
    phase: GamePhase,
    events: Vec<GameEvent>,
}

impl SnakeSession {
    /// A start cell outside the arena is replaced by the arena centre
    pub fn new(config: SnakeConfig, seed: u64) -> Self {
        let size = GridSize::new(config.width.max(1), config.height.max(1));
        let start = if size.contains(config.start) {
            config.start
        } else {
            let centre = IVec2::new((size.width / 2) as i32, (size.height / 2) as i32);
            log::warn!(
                "Snake start ({}, {}) outside {}x{} arena, using ({}, {})",
                config.start.x,
                config.start.y,
                size.width,
                size.height,
                centre.x,
                centre.y
            );
            centre
        };
        let mut session = Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            size,
            body: VecDeque::from([start]),
            velocity: IVec2::ZERO,
            pending: None,
            food: None,
            score: 0,
            phase: GamePhase::Idle,
            events: Vec::new(),
        };
        session.relocate_food();
        session
    }

    pub fn head(&self) -> IVec2 {
        self.body[0]
    }

    pub fn body(&self) -> &VecDeque<IVec2> {
        &self.body
    }

    pub fn velocity(&self) -> IVec2 {
        self.velocity
    }

    pub fn food(&self) -> Option<IVec2> {
        self.food
    }

    /// Buffer a turn for the next move. Turns along the current axis
    /// (straight ahead or straight back) are ignored.
    pub fn request_direction(&mut self, dir: IVec2) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        let same_axis = (dir.x != 0 && self.velocity.x != 0) || (dir.y != 0 && self.velocity.y != 0);
        if !same_axis {
            self.pending = Some(dir);
        }
    }

    /// Advance one cell
    pub fn step(&mut self) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        if let Some(dir) = self.pending.take() {
            self.velocity = dir;
        }
        if self.velocity == IVec2::ZERO {
            return;
        }
        self.phase = GamePhase::Active;

        let head = self.head() + self.velocity;
        if !self.size.contains(head) {
            log::info!("Snake hit the wall at ({}, {})", head.x, head.y);
            self.game_over();
            return;
        }
        if self.body.contains(&head) {
            log::info!("Snake ran into itself at ({}, {})", head.x, head.y);
            self.game_over();
            return;
        }

        self.body.push_front(head);
        if self.food == Some(head) {
            self.score += 1;
            self.events.push(GameEvent::FoodEaten { score: self.score });
            log::debug!("Food eaten, length {}", self.body.len());
            self.relocate_food();
        } else {
            self.body.pop_back();
        }
    }

    /// Uniform pick among cells the body does not cover
    fn relocate_food(&mut self) {
        let free: Vec<IVec2> = self
            .size
            .cells()
            .filter(|c| !self.body.contains(c))
            .collect();
        self.food = if free.is_empty() {
            None
        } else {
            Some(free[self.rng.random_range(0..free.len())])
        };
    }

    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver { score: self.score });
    }

    fn restore(&mut self, state: &SaveState) -> Result<(), RestoreError> {
        let save: SnakeSave = state.to_fields()?;
        validate_direction(save.direction)?;
        validate_body(&save.body_cells, self.size)?;

        self.body = save.body_cells.into_iter().collect();
        self.velocity = save.direction;
        self.pending = None;
        self.score = save.score;
        self.phase = if self.velocity == IVec2::ZERO {
            GamePhase::Idle
        } else {
            GamePhase::Active
        };
        self.events.clear();
        self.relocate_food();
        Ok(())
    }
}

fn validate_direction(dir: IVec2) -> Result<(), RestoreError> {
    let valid = [IVec2::ZERO, IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];
    if valid.contains(&dir) {
        Ok(())
    } else {
        Err(RestoreError::InvalidDirection(dir.x, dir.y))
    }
}

fn validate_body(body: &[IVec2], size: GridSize) -> Result<(), RestoreError> {
    if body.is_empty() {
        return Err(RestoreError::InvalidBody("empty"));
    }
    if body.iter().any(|c| !size.contains(*c)) {
        return Err(RestoreError::InvalidBody("cell out of bounds"));
    }
    for (i, cell) in body.iter().enumerate() {
        if body[..i].contains(cell) {
            return Err(RestoreError::InvalidBody("overlapping cells"));
        }
    }
    let connected = body.windows(2).all(|pair| {
        let d = (pair[0] - pair[1]).abs();
        d.x + d.y == 1
    });
    if !connected {
        return Err(RestoreError::InvalidBody("disconnected cells"));
    }
    Ok(())
}

impl Tickable for SnakeSession {
    /// Movement is lock-step, so `dt` is unused
    fn tick(&mut self, input: &InputSnapshot, _dt: f64) {
        for dir in input.presses().filter_map(direction_for) {
            self.request_direction(dir);
        }
        self.step();
    }

    fn is_terminal(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

impl Renderable for SnakeSession {
    fn snapshot(&self) -> RenderSnapshot {
        let width = self.size.width;
        let mut cells = vec![0; self.size.area()];
        if let Some(food) = self.food {
            cells[food.y as usize * width + food.x as usize] = FOOD_TOKEN;
        }
        for (i, seg) in self.body.iter().enumerate() {
            let token = if i == 0 { HEAD_TOKEN } else { BODY_TOKEN };
            cells[seg.y as usize * width + seg.x as usize] = token;
        }
        RenderSnapshot {
            game: GameKind::Snake,
            width,
            height: self.size.height,
            cells,
            active: None,
            score: self.score,
            phase: self.phase,
        }
    }
}

impl Persistable for SnakeSession {
    fn save(&self) -> SaveState {
        let fields = SnakeSave {
            body_cells: self.body.iter().copied().collect(),
            direction: self.velocity,
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

impl GameSession for SnakeSession {
    fn kind(&self) -> GameKind {
        GameKind::Snake
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
