//! Input buffering between ticks
//!
//! Key events arrive whenever the host's event source fires them. They only
//! ever touch the [`InputBuffer`]; sessions see a frozen [`InputSnapshot`]
//! once per tick, so tick results never depend on when a key physically
//! went down.

use std::collections::BTreeSet;

/// Logical keys the games understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
}

impl Key {
    /// Map a stable DOM `KeyboardEvent.code` string to a logical key
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" | "KeyW" => Some(Key::Up),
            "ArrowDown" | "KeyS" => Some(Key::Down),
            "ArrowLeft" | "KeyA" => Some(Key::Left),
            "ArrowRight" | "KeyD" => Some(Key::Right),
            "Space" => Some(Key::Space),
            _ => None,
        }
    }

    /// Canonical `code` for this key (the arrow, not the WASD alias)
    pub fn code(self) -> &'static str {
        match self {
            Key::Up => "ArrowUp",
            Key::Down => "ArrowDown",
            Key::Left => "ArrowLeft",
            Key::Right => "ArrowRight",
            Key::Space => "Space",
        }
    }
}

/// Press or release notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Pressed,
    Released,
}

/// A discrete key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEdge {
    pub key: Key,
    pub kind: EdgeKind,
}

/// Tick-stable view of the input state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Keys currently held down
    pub held: BTreeSet<Key>,
    /// Edges queued since the previous snapshot, oldest first
    pub edges: Vec<KeyEdge>,
}

impl InputSnapshot {
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.edges
            .iter()
            .any(|e| e.key == key && e.kind == EdgeKind::Pressed)
    }

    /// Pressed keys in arrival order
    pub fn presses(&self) -> impl Iterator<Item = Key> + '_ {
        self.edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Pressed)
            .map(|e| e.key)
    }
}

/// Accumulates key events between ticks
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    held: BTreeSet<Key>,
    edges: Vec<KeyEdge>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_key_down(&mut self, code: &str) {
        let Some(key) = Key::from_code(code) else {
            return;
        };
        self.held.insert(key);
        self.push_edge(KeyEdge {
            key,
            kind: EdgeKind::Pressed,
        });
    }

    pub fn on_key_up(&mut self, code: &str) {
        let Some(key) = Key::from_code(code) else {
            return;
        };
        self.held.remove(&key);
        self.push_edge(KeyEdge {
            key,
            kind: EdgeKind::Released,
        });
    }

    /// Take the held set plus queued edges; the edge queue starts over empty
    pub fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot {
            held: self.held.clone(),
            edges: std::mem::take(&mut self.edges),
        }
    }

    /// Forget everything, including held keys (session switch)
    pub fn clear(&mut self) {
        self.held.clear();
        self.edges.clear();
    }

    /// Same key + same kind coalesces to the latest occurrence
    fn push_edge(&mut self, edge: KeyEdge) {
        self.edges.retain(|e| *e != edge);
        self.edges.push(edge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_delivered_once() {
        let mut input = InputBuffer::new();
        input.on_key_down("ArrowLeft");

        let first = input.snapshot_for_tick();
        assert!(first.was_pressed(Key::Left));
        assert!(first.is_held(Key::Left));

        let second = input.snapshot_for_tick();
        assert!(!second.was_pressed(Key::Left));
        // Held state survives until release
        assert!(second.is_held(Key::Left));

        input.on_key_up("ArrowLeft");
        let third = input.snapshot_for_tick();
        assert!(!third.is_held(Key::Left));
        assert_eq!(
            third.edges,
            vec![KeyEdge {
                key: Key::Left,
                kind: EdgeKind::Released
            }]
        );
    }

    #[test]
    fn test_same_edge_coalesces() {
        let mut input = InputBuffer::new();
        input.on_key_down("ArrowUp");
        input.on_key_down("ArrowLeft");
        input.on_key_down("ArrowUp");

        let snap = input.snapshot_for_tick();
        let presses: Vec<Key> = snap.presses().collect();
        assert_eq!(presses, vec![Key::Left, Key::Up]);
    }

    #[test]
    fn test_unknown_codes_ignored() {
        let mut input = InputBuffer::new();
        input.on_key_down("F13");
        input.on_key_up("Escape");
        assert_eq!(input.snapshot_for_tick(), InputSnapshot::default());
    }

    #[test]
    fn test_wasd_aliases() {
        assert_eq!(Key::from_code("KeyW"), Some(Key::Up));
        assert_eq!(Key::from_code("KeyA"), Some(Key::Left));
        assert_eq!(Key::from_code("KeyS"), Some(Key::Down));
        assert_eq!(Key::from_code("KeyD"), Some(Key::Right));
        for key in [Key::Up, Key::Down, Key::Left, Key::Right, Key::Space] {
            assert_eq!(Key::from_code(key.code()), Some(key));
        }
    }

    #[test]
    fn test_press_and_release_between_ticks() {
        let mut input = InputBuffer::new();
        input.on_key_down("Space");
        input.on_key_up("Space");

        let snap = input.snapshot_for_tick();
        // The tap is still visible even though the key is no longer held
        assert!(snap.was_pressed(Key::Space));
        assert!(!snap.is_held(Key::Space));
    }
}
