/*!
# treekf - Combinatorial tree-search track finder

Rust implementation of a layer-linking track finder: starting from a seed
trajectory, a forest of candidate partial tracks is grown layer by layer,
extrapolating a statistical state estimate onto each candidate measurement
plane and folding the measurement in with a Kalman update. Branches are
scored, pruned, and finalized into ordered hit lists with fit quality.

## Features

- Per-layer hit cache with ladder-overlap sub-range queries
- Index-addressed node arena reused across events
- Kalman update with filtered-residual chi2 scoring
- Bounded tree search with hole budgets and top-K pruning
- Two interchangeable extrapolation-caching strategies
- Across-seed parallelism behind the `rayon` feature

## Modules

- [`tree`] - search engine, node arena, candidate selection, results
- [`kalman`] - the Kalman measurement update
- [`cache`] - per-layer hit partition
- [`extrapolation`] - track states and the extrapolation seam
- [`measurement`] - hits and measurement models
- [`common`] - low-level numerics

## Example

```rust,no_run
use treekf::{
    Hit, HitCache, LineExtrapolator, Plane, SearchConfig, Seed, SensorId, StateArena,
    TreeSearchEngine,
};
use nalgebra::{DMatrix, DVector};

// Three layers, eight ladders each, greedy search.
let config = SearchConfig::builder()
    .terminal_depth(6)
    .ladder_counts(vec![8, 8, 8])
    .build()
    .unwrap();
let engine = TreeSearchEngine::new(config, LineExtrapolator).unwrap();

// One event: caller-owned hits, cache built once.
let hits = vec![Hit::pixel(SensorId::new(3, 1, 1), Plane::at(3.0), 0.0, 0.0, 1e-6, 1e-6)];
let cache = HitCache::build(&hits, 3);

// One seed from upstream pattern recognition.
let seed = Seed::new(
    Plane::at(4.0),
    DVector::zeros(4),
    DMatrix::identity(4, 4) * 1e-4,
);

let mut arena = StateArena::new();
let candidates = engine.search(&hits, &cache, &seed, &mut arena);
for candidate in &candidates {
    println!("{} hits, chi2 = {}", candidate.len(), candidate.chi2());
}
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Search-tree machinery: arena, selector, engine, results
pub mod tree;

/// Kalman measurement update
pub mod kalman;

/// Per-layer hit cache
pub mod cache;

/// Track states and the extrapolation seam
pub mod extrapolation;

/// Hits and measurement models
pub mod measurement;

/// Detector identity and reference surfaces
pub mod geometry;

/// Search configuration
pub mod config;

/// Error types
pub mod errors;

/// Observability callbacks
pub mod reporter;

/// Low-level numerics
pub mod common;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use cache::{CachedHit, HitCache};
pub use config::{ExtrapolationCaching, SearchConfig, SearchConfigBuilder, SearchConfigSnapshot};
pub use extrapolation::{Extrapolator, LineExtrapolator, Seed, TrackState};
pub use geometry::{overlapping_ladder, Plane, SensorId};
pub use kalman::{FittedUpdate, KalmanUpdater};
pub use measurement::{Hit, MeasurementModel, Projection};

// Errors
pub use errors::{ConfigError, ExtrapolationFailure, FitFailure};

// Tree search
pub use tree::{
    search_seeds, CandidateSelector, NodeId, StateArena, StateNode, TrackCandidate,
    TreeSearchEngine,
};

// Observability
pub use reporter::{DebugReporter, LogReporter, NoOpReporter, RejectionReason, SearchReporter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
