//! Candidate lookup
//!
//! Maps a tree node and the depth it is about to expand into onto the
//! eligible sub-range of the hit cache. Ordinary layer steps see the whole
//! layer bucket; overlap sub-steps see only the ladder that geometrically
//! overlaps the ladder of the node's own hit.

use crate::cache::{CachedHit, HitCache};
use crate::config::SearchConfig;
use crate::geometry::overlapping_ladder;
use crate::measurement::Hit;
use crate::tree::arena::{is_overlap_depth, layer_of_depth, StateNode};

/// Selector over one event's hit cache.
#[derive(Debug, Clone, Copy)]
pub struct CandidateSelector<'a> {
    cache: &'a HitCache,
    config: &'a SearchConfig,
}

impl<'a> CandidateSelector<'a> {
    /// Create a selector for one event
    pub fn new(cache: &'a HitCache, config: &'a SearchConfig) -> Self {
        Self { cache, config }
    }

    /// Hits eligible for expanding `node` into `next_depth`.
    ///
    /// - Ordinary layer step: the full sorted bucket of that layer.
    /// - Overlap sub-step after a real hit: the sub-range of the same layer
    ///   on the overlapping ladder of the hit's own ladder.
    /// - Overlap sub-step after a hole: empty, since overlap ambiguity only
    ///   arises directly after a hit was assigned.
    pub fn candidates(&self, node: &StateNode, hits: &[Hit], next_depth: usize) -> &'a [CachedHit] {
        let layer = layer_of_depth(next_depth);

        if !is_overlap_depth(next_depth) {
            return self.cache.layer(layer);
        }

        match node.hit {
            Some(hit_index) => {
                let ladder = hits[hit_index].id.ladder;
                let n_ladders = self.config.ladder_count(layer);
                self.cache
                    .layer_ladder(layer, overlapping_ladder(ladder, n_ladders))
            }
            None => &[],
        }
    }
}
