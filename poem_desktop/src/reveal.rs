//! The typewriter reveal board.
//!
//! Every window types its text out character by character: a steady beat
//! with a longer breath after every fourth character.  The board keeps one
//! reveal per live node and is re-synced against the store every frame, so
//! a node that closes — or is consumed by a merge — takes its timer with
//! it, and a node whose text changes starts over.

use std::collections::HashMap;

use poem_graph::{NodeId, NodeStore};

/// Frames per revealed character at ~60 fps (≈100 ms).
pub const CHAR_FRAMES: u32 = 6;

/// Extra breath after every [`PAUSE_EVERY`]th character (≈600 ms).
pub const PAUSE_FRAMES: u32 = 36;
pub const PAUSE_EVERY: usize = 4;

// ════════════════════════════════════════════════════════════════════════════
// Reveal — one node's animation
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct Reveal {
    visible: usize,
    len:     usize,
    wait:    u32,
}

impl Reveal {
    fn new(len: usize) -> Self {
        Reveal { visible: 0, len, wait: CHAR_FRAMES }
    }

    /// Characters currently shown.
    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn finished(&self) -> bool {
        self.visible >= self.len
    }

    fn tick(&mut self) {
        if self.finished() {
            return;
        }
        if self.wait > 0 {
            self.wait -= 1;
            return;
        }
        self.visible += 1;
        let pause_point = self.visible % PAUSE_EVERY == 0 && self.visible < self.len;
        self.wait = if pause_point { PAUSE_FRAMES } else { CHAR_FRAMES };
    }
}

// ════════════════════════════════════════════════════════════════════════════
// RevealBoard
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct RevealBoard {
    entries: HashMap<NodeId, Reveal>,
}

impl RevealBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile with the store: start reveals for new nodes, restart any
    /// whose text length changed, drop entries for closed nodes.
    pub fn sync(&mut self, store: &NodeStore) {
        for node in store.iter() {
            let len = node.full_text.chars().count();
            let fresh = match self.entries.get(&node.id) {
                Some(r) => r.len != len,
                None => true,
            };
            if fresh {
                self.entries.insert(node.id, Reveal::new(len));
            }
        }
        self.entries.retain(|id, _| store.get(*id).is_some());
    }

    /// Advance every live reveal by one frame.
    pub fn tick(&mut self) {
        for r in self.entries.values_mut() {
            r.tick();
        }
    }

    pub fn visible(&self, id: NodeId) -> usize {
        self.entries.get(&id).map(|r| r.visible()).unwrap_or(0)
    }

    /// Word clicks gate on this — a node still typing ignores them.
    pub fn finished(&self, id: NodeId) -> bool {
        self.entries.get(&id).map(|r| r.finished()).unwrap_or(false)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn ticked(board: &mut RevealBoard, store: &NodeStore, frames: u32) {
        for _ in 0..frames {
            board.sync(store);
            board.tick();
        }
    }

    #[test]
    fn reveal_advances_one_char_per_beat() {
        let mut store = NodeStore::new();
        let id = store.create("你好嗎？", 0.0, 0.0, 0, None);
        let mut board = RevealBoard::new();

        ticked(&mut board, &store, CHAR_FRAMES + 1);
        assert_eq!(board.visible(id), 1);
        assert!(!board.finished(id));
    }

    #[test]
    fn pause_after_every_fourth_char() {
        let mut store = NodeStore::new();
        // 5 chars: the 4th is a pause point, the 5th follows after it
        let id = store.create("思緒超連結", 0.0, 0.0, 0, None);
        let mut board = RevealBoard::new();

        // 4 chars × (6 wait + reveal frame)
        ticked(&mut board, &store, 4 * (CHAR_FRAMES + 1));
        assert_eq!(board.visible(id), 4);

        // The fifth needs the long pause first
        ticked(&mut board, &store, CHAR_FRAMES + 1);
        assert_eq!(board.visible(id), 4);
        ticked(&mut board, &store, PAUSE_FRAMES);
        assert_eq!(board.visible(id), 5);
        assert!(board.finished(id));
    }

    #[test]
    fn no_trailing_pause_at_text_end() {
        let mut store = NodeStore::new();
        let id = store.create("你好嗎？", 0.0, 0.0, 0, None); // exactly 4 chars
        let mut board = RevealBoard::new();

        ticked(&mut board, &store, 4 * (CHAR_FRAMES + 1));
        assert!(board.finished(id));
    }

    #[test]
    fn closed_node_drops_its_timer() {
        let mut store = NodeStore::new();
        let id = store.create("你好嗎？", 0.0, 0.0, 0, None);
        let mut board = RevealBoard::new();
        ticked(&mut board, &store, 10);

        store.close(id);
        board.sync(&store);
        assert_eq!(board.visible(id), 0);
        assert!(!board.finished(id));
    }

    #[test]
    fn unknown_node_is_never_finished() {
        let board = RevealBoard::new();
        assert!(!board.finished(NodeId(42)));
        assert_eq!(board.visible(NodeId(42)), 0);
    }

    #[test]
    fn finished_reveal_stays_finished() {
        let mut store = NodeStore::new();
        let id = store.create("你", 0.0, 0.0, 0, None);
        let mut board = RevealBoard::new();
        ticked(&mut board, &store, 200);
        assert!(board.finished(id));
        assert_eq!(board.visible(id), 1);
    }
}
