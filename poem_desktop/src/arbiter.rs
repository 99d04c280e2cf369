//! Pointer authority arbitration.
//!
//! Two independent producers move windows: a raw mouse drag on a title
//! bar, and the virtual cursor's drag-lock.  Both funnel into the same
//! store, and both may drive the same node at once — the system does not
//! forbid simultaneous control; the position is last-writer-wins in event
//! arrival order.  Each session captures its own grab offset, so switching
//! authorities never makes a window jump.

use poem_graph::{NodeId, NodeStore};

use crate::cursor::VirtualCursor;

/// A virtually grabbed window hangs this far below the cursor.
pub const VIRTUAL_GRIP_Y: f32 = 15.0;

// ════════════════════════════════════════════════════════════════════════════
// Sessions
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
struct DragSession {
    id:      NodeId,
    grab_dx: f32,
    grab_dy: f32,
}

#[derive(Debug)]
struct ResizeSession {
    id:       NodeId,
    start_w:  f32,
    start_h:  f32,
    anchor_x: f32,
    anchor_y: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// PointerArbiter
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct PointerArbiter {
    drag:   Option<DragSession>,
    resize: Option<ResizeSession>,
}

impl PointerArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    // ── raw authority ────────────────────────────────────────────────────

    /// Begin a raw drag: focus the window and capture the pointer offset
    /// from its corner.  Stale ids start nothing.
    pub fn begin_drag(&mut self, store: &mut NodeStore, id: NodeId, mx: f32, my: f32) {
        store.focus(id);
        if let Some(node) = store.get(id) {
            self.drag = Some(DragSession { id, grab_dx: mx - node.x, grab_dy: my - node.y });
        }
    }

    pub fn begin_resize(&mut self, store: &mut NodeStore, id: NodeId, mx: f32, my: f32) {
        store.focus(id);
        if let Some(node) = store.get(id) {
            self.resize = Some(ResizeSession {
                id,
                start_w: node.width,
                start_h: node.height,
                anchor_x: mx,
                anchor_y: my,
            });
        }
    }

    /// Apply a pointer move to whichever raw session is live.
    pub fn pointer_moved(&mut self, store: &mut NodeStore, mx: f32, my: f32) {
        if let Some(d) = &self.drag {
            store.update_position(d.id, mx - d.grab_dx, my - d.grab_dy);
        } else if let Some(r) = &self.resize {
            store.update_size(r.id, r.start_w + (mx - r.anchor_x), r.start_h + (my - r.anchor_y));
        }
    }

    /// Releasing the raw pointer clears only raw state — a virtual lock on
    /// the same node survives.
    pub fn pointer_released(&mut self) {
        self.drag = None;
        self.resize = None;
    }

    pub fn dragging(&self) -> Option<NodeId> {
        self.drag.as_ref().map(|d| d.id)
    }

    // ── virtual authority ────────────────────────────────────────────────

    /// Feed the locked window one cursor position: centered under the
    /// cursor, gripped at the title bar.
    pub fn virtual_drag(store: &mut NodeStore, cursor: &VirtualCursor) {
        if !cursor.is_down {
            return;
        }
        let Some(id) = cursor.target_id else { return };
        let Some(width) = store.get(id).map(|n| n.width) else { return };
        store.update_position(id, cursor.x - width / 2.0, cursor.y - VIRTUAL_GRIP_Y);
    }

    /// Enforce the cursor invariant: a lock on a node that no longer
    /// exists is cleared, both fields together.
    pub fn release_stale_lock(cursor: &mut VirtualCursor, store: &NodeStore) {
        if let Some(id) = cursor.target_id {
            if store.get(id).is_none() {
                cursor.release();
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use poem_graph::Viewport;

    fn store_with_node() -> (NodeStore, NodeId) {
        let mut store = NodeStore::new();
        let id = store.create("你好嗎？", 100.0, 100.0, 0, None);
        (store, id)
    }

    #[test]
    fn drag_is_relative_to_grab_offset() {
        let (mut store, id) = store_with_node();
        let mut arb = PointerArbiter::new();

        // Grab 30,10 into the window
        arb.begin_drag(&mut store, id, 130.0, 110.0);
        arb.pointer_moved(&mut store, 140.0, 115.0);
        let n = store.get(id).unwrap();
        assert_eq!((n.x, n.y), (110.0, 105.0));

        // No jump on the very first move back to the grab point
        arb.pointer_moved(&mut store, 130.0, 110.0);
        let n = store.get(id).unwrap();
        assert_eq!((n.x, n.y), (100.0, 100.0));
    }

    #[test]
    fn begin_drag_focuses() {
        let (mut store, id) = store_with_node();
        let other = store.create("回音", 600.0, 600.0, 0, None);
        let mut arb = PointerArbiter::new();
        assert_eq!(store.paint_order().last().unwrap().id, other);

        arb.begin_drag(&mut store, id, 110.0, 110.0);
        assert_eq!(store.paint_order().last().unwrap().id, id);
        assert_eq!(arb.dragging(), Some(id));
    }

    #[test]
    fn stale_drag_starts_nothing() {
        let (mut store, id) = store_with_node();
        store.close(id);
        let mut arb = PointerArbiter::new();
        arb.begin_drag(&mut store, id, 0.0, 0.0);
        assert_eq!(arb.dragging(), None);
        arb.pointer_moved(&mut store, 50.0, 50.0); // no-op, no panic
    }

    #[test]
    fn resize_is_delta_from_anchor() {
        let (mut store, id) = store_with_node();
        let (w0, h0) = {
            let n = store.get(id).unwrap();
            (n.width, n.height)
        };
        let mut arb = PointerArbiter::new();
        arb.begin_resize(&mut store, id, 300.0, 240.0);
        arb.pointer_moved(&mut store, 340.0, 260.0);
        let n = store.get(id).unwrap();
        assert_eq!((n.width, n.height), (w0 + 40.0, h0 + 20.0));

        // Dragging far inward clamps at the minimum
        arb.pointer_moved(&mut store, -2000.0, -2000.0);
        let n = store.get(id).unwrap();
        assert_eq!((n.width, n.height), (220.0, 150.0));
    }

    #[test]
    fn release_clears_only_raw_state() {
        let (mut store, id) = store_with_node();
        let mut arb = PointerArbiter::new();
        let mut cursor = VirtualCursor::centered(Viewport::new(1280.0, 800.0));
        cursor.grab(id);

        arb.begin_drag(&mut store, id, 110.0, 110.0);
        arb.pointer_released();
        assert_eq!(arb.dragging(), None);
        assert!(cursor.locked_on(id));
    }

    #[test]
    fn virtual_drag_centers_under_cursor() {
        let (mut store, id) = store_with_node();
        let width = store.get(id).unwrap().width;
        let mut cursor = VirtualCursor::centered(Viewport::new(1280.0, 800.0));
        cursor.grab(id);
        cursor.x = 500.0;
        cursor.y = 400.0;

        PointerArbiter::virtual_drag(&mut store, &cursor);
        let n = store.get(id).unwrap();
        assert_eq!(n.x, 500.0 - width / 2.0);
        assert_eq!(n.y, 400.0 - VIRTUAL_GRIP_Y);
    }

    #[test]
    fn simultaneous_authorities_last_writer_wins() {
        let (mut store, id) = store_with_node();
        let mut arb = PointerArbiter::new();
        let mut cursor = VirtualCursor::centered(Viewport::new(1280.0, 800.0));
        cursor.grab(id);
        cursor.x = 800.0;
        cursor.y = 300.0;

        arb.begin_drag(&mut store, id, 110.0, 110.0);
        arb.pointer_moved(&mut store, 200.0, 200.0);
        PointerArbiter::virtual_drag(&mut store, &cursor);
        let n = store.get(id).unwrap();
        // The virtual update landed last
        assert_eq!(n.y, 300.0 - VIRTUAL_GRIP_Y);

        arb.pointer_moved(&mut store, 210.0, 210.0);
        let n = store.get(id).unwrap();
        // Now the raw update landed last
        assert_eq!((n.x, n.y), (200.0, 200.0));
    }

    #[test]
    fn lock_on_closed_node_is_cleared() {
        let (mut store, id) = store_with_node();
        let mut cursor = VirtualCursor::centered(Viewport::new(1280.0, 800.0));
        cursor.grab(id);
        cursor.progress = 1.0;

        store.close(id);
        PointerArbiter::release_stale_lock(&mut cursor, &store);
        assert!(!cursor.is_down);
        assert_eq!(cursor.target_id, None);
        assert_eq!(cursor.progress, 0.0);
    }
}
