//! Observability for search execution
//!
//! [`SearchReporter`] receives callbacks at the key points of a per-seed
//! search without polluting the engine's inner loop. All methods default to
//! empty bodies; [`NoOpReporter`] compiles to zero overhead,
//! [`DebugReporter`] captures events for inspection in tests and studies,
//! and [`LogReporter`] forwards them to the `log` facade.

use crate::errors::{ExtrapolationFailure, FitFailure};
use crate::extrapolation::Seed;
use crate::tree::arena::NodeId;
use crate::tree::result::TrackCandidate;

/// Why a candidate hit did not become a child node.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// The extrapolation onto the hit's plane failed
    Extrapolation(ExtrapolationFailure),
    /// The Kalman update failed
    Fit(FitFailure),
    /// The predicted residual fell outside the Mahalanobis gate
    Gated {
        /// Observed Mahalanobis distance
        distance: f64,
    },
    /// The child was scored but not among the top-K of its parent
    Pruned,
}

/// Callbacks fired while a seed's tree is grown.
pub trait SearchReporter {
    /// A seed's search is about to start
    fn on_seed_start(&mut self, _seed: &Seed) {}

    /// A node is being expanded against a number of candidates
    fn on_node_expanded(&mut self, _node: NodeId, _next_depth: usize, _n_candidates: usize) {}

    /// A candidate hit was rejected
    fn on_candidate_rejected(&mut self, _next_depth: usize, _hit: usize, _reason: &RejectionReason) {
    }

    /// A terminal node was finalized into a result
    fn on_result(&mut self, _candidate: &TrackCandidate) {}
}

/// Reporter that does nothing; the default for production searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl SearchReporter for NoOpReporter {}

/// Reporter capturing every event for later inspection.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    /// Number of seeds started
    pub seeds: usize,
    /// (node, next depth, candidate count) per expansion
    pub expansions: Vec<(NodeId, usize, usize)>,
    /// (next depth, hit index, reason) per rejection
    pub rejections: Vec<(usize, usize, RejectionReason)>,
    /// Finalized candidates
    pub results: Vec<TrackCandidate>,
}

impl DebugReporter {
    /// Create an empty debug reporter
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchReporter for DebugReporter {
    fn on_seed_start(&mut self, _seed: &Seed) {
        self.seeds += 1;
    }

    fn on_node_expanded(&mut self, node: NodeId, next_depth: usize, n_candidates: usize) {
        self.expansions.push((node, next_depth, n_candidates));
    }

    fn on_candidate_rejected(&mut self, next_depth: usize, hit: usize, reason: &RejectionReason) {
        self.rejections.push((next_depth, hit, reason.clone()));
    }

    fn on_result(&mut self, candidate: &TrackCandidate) {
        self.results.push(candidate.clone());
    }
}

/// Reporter forwarding events to the `log` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl SearchReporter for LogReporter {
    fn on_seed_start(&mut self, seed: &Seed) {
        log::debug!(
            "Seed search started at plane w={}",
            seed.state.plane.w
        );
    }

    fn on_node_expanded(&mut self, node: NodeId, next_depth: usize, n_candidates: usize) {
        log::trace!(
            "Expanding node {:?} into depth {}: {} candidates",
            node,
            next_depth,
            n_candidates
        );
    }

    fn on_candidate_rejected(&mut self, next_depth: usize, hit: usize, reason: &RejectionReason) {
        log::trace!(
            "Rejected hit {} at depth {}: {:?}",
            hit,
            next_depth,
            reason
        );
    }

    fn on_result(&mut self, candidate: &TrackCandidate) {
        log::debug!(
            "Finalized candidate: {} hits, {} holes, chi2={:.3}",
            candidate.len(),
            candidate.hole_count(),
            candidate.chi2()
        );
    }
}
