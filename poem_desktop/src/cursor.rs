//! The virtual cursor — the on-screen avatar of the light tracker.

use poem_graph::{NodeId, Viewport};

/// Ephemeral pointer state driven by the vision rig.  Not persisted.
#[derive(Clone, Debug)]
pub struct VirtualCursor {
    pub x: f32,
    pub y: f32,
    /// True while a synthesized grab holds a window.
    pub is_down: bool,
    /// The grabbed window.  Set and cleared together with `is_down`.
    pub target_id: Option<NodeId>,
    /// Click charge in `[0,1]`, rendered as the cursor's fill ring.
    pub progress: f32,
}

impl VirtualCursor {
    pub fn centered(viewport: Viewport) -> Self {
        let (x, y) = viewport.center();
        VirtualCursor { x, y, is_down: false, target_id: None, progress: 0.0 }
    }

    pub fn grab(&mut self, id: NodeId) {
        self.is_down = true;
        self.target_id = Some(id);
    }

    /// Clears the whole grab state as one unit, keeping the invariant
    /// `is_down ⇒ target_id exists`.
    pub fn release(&mut self) {
        self.is_down = false;
        self.target_id = None;
        self.progress = 0.0;
    }

    pub fn locked_on(&self, id: NodeId) -> bool {
        self.is_down && self.target_id == Some(id)
    }
}
