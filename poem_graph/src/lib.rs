//! # poem_graph
//!
//! The node-graph engine behind the hyperlink poetry desktop: every poem
//! lives in a draggable window ("node"), and the graph grows by two moves:
//!
//! * **Spawn** — clicking a word inside a node extends it into a child
//!   fragment drawn from a fixed lexicon, placed near its parent.
//! * **Merge** — two windows close enough together collapse into one node
//!   carrying both texts, one generation deeper.
//!
//! | Operation | Effect |
//! |---|---|
//! | `NodeStore::create` | allocate id, size from text + depth, place on top |
//! | `NodeStore::close` | remove; stale ids are no-ops |
//! | `NodeStore::focus` | raise to top; last caller wins the top slot |
//! | `spawn::spawn_from_word` | word → child node near the parent, on-screen |
//! | `merge::attempt_merge` | nearest neighbor under 400 units → one merged node |
//! | `background::next_background` | pulse to a different effect mode |
//!
//! The store is the single mutable source of truth; both pointer
//! authorities (mouse drag and the virtual light-cursor) mutate node state
//! only through it.  Randomness is injected as `&mut impl Rng`, so the
//! engine is deterministic under a seeded generator.

pub mod background;
pub mod lexicon;
pub mod merge;
pub mod node;
pub mod spawn;
pub mod store;

pub use background::{next_background, BackgroundKind};
pub use merge::{attempt_merge, MERGE_DISTANCE};
pub use node::{font_size, node_size, NodeId, PoetryNode, Viewport, TITLE_BAR_H};
pub use spawn::spawn_from_word;
pub use store::NodeStore;
