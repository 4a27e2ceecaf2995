//! Finalized track candidates
//!
//! A terminal tree node is flattened into an immutable [`TrackCandidate`]:
//! the ordered hit list of its path plus the accumulated fit quality.
//! Finalization walks parent links only and introduces no floating-point
//! work, so it is deterministic for a given tree.

use crate::tree::arena::{NodeId, StateArena};

/// One candidate track produced by a seed's search.
///
/// Hit indices refer into the hit collection the event's cache was built
/// from and are ordered root-to-leaf (outermost searched layer first).
/// Holes are skipped in the hit list and only reflected in `hole_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackCandidate {
    hits: Vec<usize>,
    chi2: f64,
    hole_count: usize,
}

impl TrackCandidate {
    /// Finalize the path ending at `leaf` into a candidate.
    pub fn from_leaf(arena: &StateArena, leaf: NodeId) -> Self {
        let mut hits: Vec<usize> = arena
            .path_to_root(leaf)
            .filter_map(|id| arena.get(id).hit)
            .collect();
        hits.reverse();

        let node = arena.get(leaf);
        Self {
            hits,
            chi2: node.chi2,
            hole_count: node.hole_count,
        }
    }

    /// Assigned hits in root-to-leaf order
    #[inline]
    pub fn hit_indices(&self) -> &[usize] {
        &self.hits
    }

    /// Accumulated chi2 of the path
    #[inline]
    pub fn chi2(&self) -> f64 {
        self.chi2
    }

    /// Number of ordinary layers the path skipped
    #[inline]
    pub fn hole_count(&self) -> usize {
        self.hole_count
    }

    /// Number of assigned hits
    #[inline]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether the candidate carries no hits at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
