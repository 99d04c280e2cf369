//! The merge engine: two proximate windows collapse into one.
//!
//! The decision is computed against the current state, then the removal of
//! both sources and the creation of the merged node are applied inside the
//! same exclusive store mutation — observers only ever see the state before
//! or after the whole transaction.

use crate::node::NodeId;
use crate::store::NodeStore;

/// A neighbor qualifies when its center lies strictly closer than this.
pub const MERGE_DISTANCE: f32 = 400.0;

/// Connector joining the two fragments' full text.
pub const MERGE_JOIN: &str = "，";

/// Merge `source_id` with its nearest qualifying neighbor.
///
/// Candidates are scanned in store order with a strict `<`, so of several
/// equidistant neighbors the first encountered wins.  Eligibility is only
/// evaluated from the initiating node's perspective — no stable matching.
/// Returns the merged node's id, or `None` when the source is stale or no
/// neighbor is close enough (the store is then untouched).
pub fn attempt_merge(store: &mut NodeStore, source_id: NodeId) -> Option<NodeId> {
    let source = store.get(source_id)?.clone();
    let (sx, sy) = source.center();

    let mut closest: Option<NodeId> = None;
    let mut min_dist = MERGE_DISTANCE;
    for other in store.iter().filter(|n| n.id != source_id) {
        let (ox, oy) = other.center();
        let dist = ((sx - ox).powi(2) + (sy - oy).powi(2)).sqrt();
        if dist < min_dist {
            min_dist = dist;
            closest = Some(other.id);
        }
    }

    let target = store.get(closest?)?.clone();

    let merged_text = format!("{}{}{}", source.full_text, MERGE_JOIN, target.full_text);
    let depth = source.depth.max(target.depth) + 1;
    let x = (source.x + target.x) / 2.0;
    let y = (source.y + target.y) / 2.0;

    // Single transaction: both consumed, one created, no lineage.
    store.close(source.id);
    store.close(target.id);
    Some(store.create(&merged_text, x, y, depth, None))
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_candidate_leaves_store_unchanged() {
        let mut store = NodeStore::new();
        let a = store.create("是否聽見回音", 0.0, 0.0, 0, None);
        let b = store.create("就像雨後的光", 2000.0, 2000.0, 0, None);

        assert!(attempt_merge(&mut store, a).is_none());
        assert_eq!(store.len(), 2);
        assert!(store.get(a).is_some());
        assert!(store.get(b).is_some());
    }

    #[test]
    fn coincident_nodes_merge_into_one() {
        let mut store = NodeStore::new();
        let a = store.create("是否聽見回音", 100.0, 100.0, 1, None);
        let b = store.create("就像雨後的光", 100.0, 100.0, 3, None);

        let merged = attempt_merge(&mut store, a).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get(a).is_none());
        assert!(store.get(b).is_none());

        let node = store.get(merged).unwrap();
        assert_eq!(node.depth, 4);
        assert!(node.full_text.contains("是否聽見回音"));
        assert!(node.full_text.contains("就像雨後的光"));
        assert_eq!(node.parent_id, None);
    }

    #[test]
    fn merged_text_uses_connector() {
        let mut store = NodeStore::new();
        let a = store.create("回音", 0.0, 0.0, 0, None);
        store.create("微涼", 10.0, 10.0, 0, None);

        let merged = attempt_merge(&mut store, a).unwrap();
        assert_eq!(store.get(merged).unwrap().full_text, "回音，微涼");
    }

    #[test]
    fn merged_position_is_anchor_midpoint() {
        let mut store = NodeStore::new();
        let a = store.create("回音", 100.0, 200.0, 0, None);
        store.create("微涼", 200.0, 100.0, 0, None);

        let merged = attempt_merge(&mut store, a).unwrap();
        let n = store.get(merged).unwrap();
        assert_eq!((n.x, n.y), (150.0, 150.0));
    }

    #[test]
    fn picks_nearest_neighbor() {
        let mut store = NodeStore::new();
        let a = store.create("回音", 0.0, 0.0, 0, None);
        let near = store.create("微涼", 30.0, 0.0, 0, None);
        let far = store.create("假象", 300.0, 0.0, 0, None);

        attempt_merge(&mut store, a).unwrap();
        assert!(store.get(near).is_none());
        assert!(store.get(far).is_some());
    }

    #[test]
    fn equidistant_ties_break_in_store_order() {
        let mut store = NodeStore::new();
        // Both neighbors sized identically, mirrored around the source
        let a = store.create("回音", 500.0, 500.0, 0, None);
        let first = store.create("微涼", 560.0, 500.0, 0, None);
        let second = store.create("微涼", 440.0, 500.0, 0, None);

        attempt_merge(&mut store, a).unwrap();
        assert!(store.get(first).is_none());
        assert!(store.get(second).is_some());
    }

    #[test]
    fn threshold_is_strict() {
        let mut store = NodeStore::new();
        // Identical sizes: center distance equals anchor distance
        let a = store.create("回音", 0.0, 0.0, 0, None);
        store.create("回音", MERGE_DISTANCE, 0.0, 0, None);

        assert!(attempt_merge(&mut store, a).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn stale_source_is_noop() {
        let mut store = NodeStore::new();
        let a = store.create("回音", 0.0, 0.0, 0, None);
        store.create("微涼", 0.0, 0.0, 0, None);
        store.close(a);

        assert!(attempt_merge(&mut store, a).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn merge_depth_exceeds_both_parents() {
        let mut store = NodeStore::new();
        let a = store.create("回音", 0.0, 0.0, 2, None);
        store.create("微涼", 0.0, 0.0, 2, None);

        let merged = attempt_merge(&mut store, a).unwrap();
        assert_eq!(store.get(merged).unwrap().depth, 3);
    }
}
