//! Character-grid rendering

use crate::games::GameKind;
use crate::platform::RenderSink;
use crate::sim::snake::{BODY_TOKEN, FOOD_TOKEN, HEAD_TOKEN};
use crate::sim::{GamePhase, PieceKind, RenderSnapshot};

const EMPTY_GLYPH: char = '.';

fn glyph(game: GameKind, token: u8) -> char {
    if token == 0 {
        return EMPTY_GLYPH;
    }
    match game {
        GameKind::Tetris => match PieceKind::from_token(token) {
            Some(PieceKind::I) => 'I',
            Some(PieceKind::O) => 'O',
            Some(PieceKind::T) => 'T',
            Some(PieceKind::S) => 'S',
            Some(PieceKind::Z) => 'Z',
            Some(PieceKind::J) => 'J',
            Some(PieceKind::L) => 'L',
            None => '?',
        },
        GameKind::Snake => match token {
            HEAD_TOKEN => '@',
            BODY_TOKEN => 'o',
            FOOD_TOKEN => '*',
            _ => '?',
        },
    }
}

/// Draw a frame: one line per board row, then a status line
pub fn render_text(frame: &RenderSnapshot) -> String {
    let mut out = String::with_capacity((frame.width + 1) * (frame.height + 1) + 32);
    for y in 0..frame.height {
        out.extend((0..frame.width).map(|x| glyph(frame.game, frame.composed(x, y))));
        out.push('\n');
    }
    out.push_str(&format!("{}  score {}", frame.game.name(), frame.score));
    match frame.phase {
        GamePhase::Idle => out.push_str("  (press an arrow key)"),
        GamePhase::Active => {}
        GamePhase::GameOver => out.push_str("  GAME OVER"),
    }
    out
}

/// Keeps the latest frame as text
#[derive(Debug, Default)]
pub struct TextRenderer {
    last: String,
    frames: u64,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent frame, empty before the first render
    pub fn last_frame(&self) -> &str {
        &self.last
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for TextRenderer {
    fn render(&mut self, frame: &RenderSnapshot) {
        self.last = render_text(frame);
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ActiveView;
    use glam::IVec2;

    fn frame(game: GameKind, width: usize, height: usize) -> RenderSnapshot {
        RenderSnapshot {
            game,
            width,
            height,
            cells: vec![0; width * height],
            active: None,
            score: 0,
            phase: GamePhase::Active,
        }
    }

    #[test]
    fn test_active_piece_drawn_over_board() {
        let mut snap = frame(GameKind::Tetris, 4, 2);
        snap.cells[4] = PieceKind::Z.token();
        snap.active = Some(ActiveView {
            cells: vec![IVec2::new(1, 0), IVec2::new(2, 0), IVec2::new(1, -1)],
            anchor: IVec2::new(1, -1),
            token: PieceKind::T.token(),
        });
        snap.score = 300;

        assert_eq!(render_text(&snap), ".TT.\nZ...\nTetris  score 300");
    }

    #[test]
    fn test_snake_glyphs_and_status() {
        let mut snap = frame(GameKind::Snake, 3, 1);
        snap.cells = vec![HEAD_TOKEN, BODY_TOKEN, FOOD_TOKEN];
        snap.phase = GamePhase::GameOver;
        assert_eq!(render_text(&snap), "@o*\nClassic Snake  score 0  GAME OVER");
    }

    #[test]
    fn test_renderer_keeps_last_frame() {
        let mut renderer = TextRenderer::new();
        assert_eq!(renderer.last_frame(), "");
        let mut snap = frame(GameKind::Snake, 2, 1);
        snap.phase = GamePhase::Idle;
        renderer.render(&snap);
        renderer.render(&snap);
        assert_eq!(renderer.frames_rendered(), 2);
        assert!(renderer.last_frame().starts_with("..\n"));
        assert!(renderer.last_frame().ends_with("(press an arrow key)"));
    }
}
