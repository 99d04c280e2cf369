//! The spawn engine: a clicked word becomes a child window.
//!
//! The chosen extension phrase lands at a random offset from its parent,
//! bounded so the new window never opens fully off-screen.

use rand::Rng;

use crate::lexicon;
use crate::node::{node_size, NodeId, Viewport};
use crate::store::NodeStore;

/// Random placement scatter around the parent's top-left, per axis.
pub const SCATTER: f32 = 150.0;

/// Margins keeping a spawned window on-screen: left/top inset, right slack
/// past the window width, and bottom headroom above the taskbar.
pub const EDGE_INSET:   f32 = 20.0;
pub const RIGHT_SLACK:  f32 = 40.0;
pub const BOTTOM_ROOM:  f32 = 300.0;

/// Spawn a child node from a word clicked in `parent_id`.
///
/// The word resolves through the extension table (falling back to the
/// default set), one option is chosen uniformly, and the child is created
/// at `parent.depth + 1` with its lineage recorded.  A stale parent is a
/// no-op.  On success the caller pulses the background.
pub fn spawn_from_word(
    store: &mut NodeStore,
    word: &str,
    parent_id: NodeId,
    viewport: Viewport,
    rng: &mut impl Rng,
) -> Option<NodeId> {
    let (px, py, parent_depth) = {
        let parent = store.get(parent_id)?;
        (parent.x, parent.y, parent.depth)
    };

    let options = lexicon::extensions_for(word);
    let text = options[rng.gen_range(0..options.len())];
    let depth = parent_depth + 1;
    let (width, _) = node_size(text, depth);

    // Scatter around the parent, then pull back inside the viewport.  The
    // lower bound wins when a huge window inverts the interval.
    let x = (px + rng.gen_range(-SCATTER..SCATTER))
        .min(viewport.width - width - RIGHT_SLACK)
        .max(EDGE_INSET);
    let y = (py + rng.gen_range(-SCATTER..SCATTER))
        .min(viewport.height - BOTTOM_ROOM)
        .max(EDGE_INSET);

    Some(store.create(text, x, y, depth, Some(parent_id)))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
