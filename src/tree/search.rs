//! Tree-search engine
//!
//! Grows one search tree per seed: at every node the engine selects the
//! eligible hits of the next depth, extrapolates the node's state onto each
//! candidate plane, folds the candidate in with a Kalman update, scores the
//! children and keeps the best few, then recurses until the terminal depth.
//! Terminal nodes are finalized into [`TrackCandidate`]s.
//!
//! A failed extrapolation or update only discards the affected candidate; a
//! node whose candidates all fail (and whose hole budget is exhausted) is a
//! dead end, not an error. A seed producing zero results is a legitimate
//! outcome.

use smallvec::SmallVec;

use crate::cache::{CachedHit, HitCache};
use crate::config::{ExtrapolationCaching, SearchConfig};
use crate::errors::ConfigError;
use crate::extrapolation::{Extrapolator, Seed, TrackState};
use crate::geometry::Plane;
use crate::kalman::KalmanUpdater;
use crate::measurement::Hit;
use crate::reporter::{NoOpReporter, RejectionReason, SearchReporter};
use crate::tree::arena::{is_overlap_depth, NodeId, StateArena, StateNode};
use crate::tree::result::TrackCandidate;
use crate::tree::selector::CandidateSelector;

/// A scored prospective child, kept off the arena until selection has
/// decided it survives.
#[derive(Debug, Clone)]
struct ScoredChild {
    hit: Option<usize>,
    state: Option<TrackState>,
    chi2: f64,
    weight: f64,
    hole_count: usize,
    consecutive_holes: usize,
}

/// The combinatorial tree-search track finder.
///
/// Holds a validated configuration and the extrapolation capability; all
/// per-event data (hits, cache, arena) is passed into [`search`] so one
/// engine can serve any number of events and, with the `rayon` feature, any
/// number of concurrent seeds.
///
/// [`search`]: TreeSearchEngine::search
#[derive(Debug, Clone)]
pub struct TreeSearchEngine<E> {
    config: SearchConfig,
    extrapolator: E,
}

impl<E: Extrapolator> TreeSearchEngine<E> {
    /// Create an engine, validating the configuration.
    ///
    /// Configuration problems are fatal here, before any search begins.
    pub fn new(config: SearchConfig, extrapolator: E) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            extrapolator,
        })
    }

    /// The engine's configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the search for one seed.
    ///
    /// `hits` is the collection the `cache` was built from; `arena` is
    /// cleared and reused. Returns every finalized candidate of the seed's
    /// tree, best-ranked path first.
    pub fn search(
        &self,
        hits: &[Hit],
        cache: &HitCache,
        seed: &Seed,
        arena: &mut StateArena,
    ) -> Vec<TrackCandidate> {
        self.search_with_reporter(hits, cache, seed, arena, &mut NoOpReporter)
    }

    /// Run the search for one seed with observability callbacks.
    pub fn search_with_reporter<R: SearchReporter>(
        &self,
        hits: &[Hit],
        cache: &HitCache,
        seed: &Seed,
        arena: &mut StateArena,
        reporter: &mut R,
    ) -> Vec<TrackCandidate> {
        arena.clear();
        reporter.on_seed_start(seed);

        let selector = CandidateSelector::new(cache, &self.config);
        let root = arena.push_root(self.config.terminal_depth, seed.state.clone());

        let mut results = Vec::new();
        let mut stack = vec![root];

        while let Some(node_id) = stack.pop() {
            let depth = arena.get(node_id).depth;
            if depth == 0 {
                let candidate = TrackCandidate::from_leaf(arena, node_id);
                reporter.on_result(&candidate);
                results.push(candidate);
                continue;
            }

            let next_depth = depth - 1;
            let candidates = selector.candidates(arena.get(node_id), hits, next_depth);
            reporter.on_node_expanded(node_id, next_depth, candidates.len());

            let children = self.expand(node_id, candidates, hits, arena, next_depth, reporter);

            // Depth-first with the best-ranked child on top of the stack.
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }

        results
    }

    /// Advance, fit, score and select the children of one node.
    fn expand<R: SearchReporter>(
        &self,
        node_id: NodeId,
        candidates: &[CachedHit],
        hits: &[Hit],
        arena: &mut StateArena,
        next_depth: usize,
        reporter: &mut R,
    ) -> SmallVec<[NodeId; 4]> {
        let Some(start_state) = arena.inherited_state(node_id).cloned() else {
            return SmallVec::new();
        };
        let (parent_chi2, parent_holes, parent_consecutive) = {
            let parent = arena.get(node_id);
            (parent.chi2, parent.hole_count, parent.consecutive_holes)
        };

        // Shared-plane caching: one full extrapolation onto a common
        // reference surface of the target layer, refined per candidate.
        let mut cached: Option<TrackState> = None;
        if self.config.caching == ExtrapolationCaching::SharedPlane && !candidates.is_empty() {
            let mean_w = candidates
                .iter()
                .map(|entry| hits[entry.index].plane.w)
                .sum::<f64>()
                / candidates.len() as f64;
            cached = self
                .extrapolator
                .extrapolate(&start_state, &Plane::at(mean_w))
                .ok();
        }

        let mut scored: SmallVec<[ScoredChild; 8]> = SmallVec::new();

        for entry in candidates {
            let hit = &hits[entry.index];

            let base = cached.as_ref().unwrap_or(&start_state);
            let extrapolated = match self.extrapolator.extrapolate(base, &hit.plane) {
                Ok(state) => state,
                Err(failure) => {
                    reporter.on_candidate_rejected(
                        next_depth,
                        entry.index,
                        &RejectionReason::Extrapolation(failure),
                    );
                    continue;
                }
            };

            // First-hit caching: the first successful full extrapolation is
            // reused as the launch state of the remaining siblings.
            if self.config.caching == ExtrapolationCaching::FirstHit && cached.is_none() {
                cached = Some(extrapolated.clone());
            }

            if self.config.mahalanobis_gate.is_finite() {
                match KalmanUpdater::predicted_mahalanobis(&extrapolated, hit) {
                    Ok(distance) if distance > self.config.mahalanobis_gate => {
                        reporter.on_candidate_rejected(
                            next_depth,
                            entry.index,
                            &RejectionReason::Gated { distance },
                        );
                        continue;
                    }
                    Ok(_) => {}
                    Err(failure) => {
                        reporter.on_candidate_rejected(
                            next_depth,
                            entry.index,
                            &RejectionReason::Fit(failure),
                        );
                        continue;
                    }
                }
            }

            match KalmanUpdater::fit(&extrapolated, hit) {
                Ok(update) if update.chi2_increment.is_finite() => {
                    scored.push(ScoredChild {
                        hit: Some(entry.index),
                        state: Some(update.state),
                        chi2: parent_chi2 + update.chi2_increment,
                        weight: -update.chi2_increment,
                        hole_count: parent_holes,
                        consecutive_holes: 0,
                    });
                }
                Ok(_) => {
                    reporter.on_candidate_rejected(
                        next_depth,
                        entry.index,
                        &RejectionReason::Fit(crate::errors::FitFailure::SingularInnovation),
                    );
                }
                Err(failure) => {
                    reporter.on_candidate_rejected(
                        next_depth,
                        entry.index,
                        &RejectionReason::Fit(failure),
                    );
                }
            }
        }

        // The no-hit branch. Skipping an overlap sub-step is the expected
        // default and never counts against the budgets; skipping an ordinary
        // layer is a hole and must respect both the per-path total and the
        // consecutive-layer bound.
        if is_overlap_depth(next_depth) {
            scored.push(ScoredChild {
                hit: None,
                state: None,
                chi2: parent_chi2,
                weight: -self.config.hole_penalty,
                hole_count: parent_holes,
                consecutive_holes: parent_consecutive,
            });
        } else if parent_holes < self.config.max_holes_per_path
            && parent_consecutive < self.config.max_consecutive_holes
        {
            scored.push(ScoredChild {
                hit: None,
                state: None,
                chi2: parent_chi2,
                weight: -self.config.hole_penalty,
                hole_count: parent_holes + 1,
                consecutive_holes: parent_consecutive + 1,
            });
        }

        // Stable ranking: ties keep candidate order, the no-hit branch last.
        scored.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        if scored.len() > self.config.branch_keep_count {
            for dropped in &scored[self.config.branch_keep_count..] {
                if let Some(hit) = dropped.hit {
                    reporter.on_candidate_rejected(next_depth, hit, &RejectionReason::Pruned);
                }
            }
            scored.truncate(self.config.branch_keep_count);
        }

        arena.get_mut(node_id).cached_state = cached;

        scored
            .into_iter()
            .map(|child| {
                let fitted = child.hit.is_some();
                arena.push(StateNode {
                    depth: next_depth,
                    parent: Some(node_id),
                    hit: child.hit,
                    state: child.state,
                    cached_state: None,
                    chi2: child.chi2,
                    weight: child.weight,
                    advanced: fitted,
                    fitted,
                    hole_count: child.hole_count,
                    consecutive_holes: child.consecutive_holes,
                })
            })
            .collect()
    }
}

/// Run many seeds against one event's hit cache.
///
/// The cache is immutable after build and shared by all searches; every
/// seed gets a private arena. With the `rayon` feature the seeds are
/// processed on the thread pool, otherwise sequentially with one reused
/// arena. Result order follows seed order either way.
pub fn search_seeds<E: Extrapolator>(
    engine: &TreeSearchEngine<E>,
    hits: &[Hit],
    cache: &HitCache,
    seeds: &[Seed],
) -> Vec<Vec<TrackCandidate>> {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        seeds
            .par_iter()
            .map(|seed| {
                let mut arena = StateArena::new();
                engine.search(hits, cache, seed, &mut arena)
            })
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        let mut arena = StateArena::new();
        seeds
            .iter()
            .map(|seed| engine.search(hits, cache, seed, &mut arena))
            .collect()
    }
}
