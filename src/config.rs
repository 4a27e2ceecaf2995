//! Search configuration
//!
//! All knobs of the tree search live in [`SearchConfig`], validated once at
//! engine construction; nothing is looked up from global state during a
//! search. [`SearchConfigSnapshot`] is the serializable view used to record
//! or compare configurations across runs.

use crate::errors::ConfigError;
use serde::Serialize;

/// Default number of children kept per node (greedy path)
pub const DEFAULT_BRANCH_KEEP_COUNT: usize = 1;
/// Default bound on missing-hit layers per path
pub const DEFAULT_MAX_HOLES_PER_PATH: usize = 1;
/// Default bound on consecutive missing-hit layers (layer jump)
pub const DEFAULT_MAX_CONSECUTIVE_HOLES: usize = 1;
/// Default chi2-equivalent penalty of skipping a layer
pub const DEFAULT_HOLE_PENALTY: f64 = 20.0;

/// Which intermediate extrapolation the engine caches while expanding the
/// candidates of one parent node.
///
/// Both strategies satisfy the same advance contract and agree within
/// extrapolation tolerance; they differ in which reference state is computed
/// once and reused for the siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtrapolationCaching {
    /// Extrapolate the parent once onto a common reference surface of the
    /// target layer, then refine the small residual step per candidate.
    SharedPlane,
    /// Extrapolate fully onto the first viable candidate's plane and cache
    /// that state; later siblings extrapolate (possibly backward) from it.
    #[default]
    FirstHit,
}

impl ExtrapolationCaching {
    fn name(&self) -> &'static str {
        match self {
            ExtrapolationCaching::SharedPlane => "shared-plane",
            ExtrapolationCaching::FirstHit => "first-hit",
        }
    }
}

/// Configuration of one tree-search engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Root depth `N` of every search tree. Even, >= 2: each searched layer
    /// occupies an ordinary step (odd depth) and an overlap sub-step (even
    /// depth), so `N/2` layers are visited.
    pub terminal_depth: usize,

    /// Number of children kept per node after scoring (`K`). 1 gives a
    /// greedy single path, larger values keep alternates for later
    /// disambiguation.
    pub branch_keep_count: usize,

    /// Maximum number of ordinary layers a path may skip in total.
    pub max_holes_per_path: usize,

    /// Maximum number of *consecutive* ordinary layers a path may skip.
    pub max_consecutive_holes: usize,

    /// chi2-equivalent penalty of the no-hit branch. A candidate hit is
    /// preferred over skipping exactly when its chi2 increment stays below
    /// this value.
    pub hole_penalty: f64,

    /// Pre-fit gate on the predicted-residual Mahalanobis distance.
    /// `f64::INFINITY` disables gating.
    pub mahalanobis_gate: f64,

    /// Extrapolation caching strategy.
    pub caching: ExtrapolationCaching,

    /// Number of ladders per layer, index `layer - 1`. Used as the modulus
    /// of the overlap-ladder arithmetic; must cover layers `1..=N/2`.
    pub ladder_counts: Vec<usize>,
}

impl SearchConfig {
    /// Start building a configuration
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }

    /// Number of physical layers a search visits
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.terminal_depth / 2
    }

    /// Ladder count of a layer (1-based). Zero for unconfigured layers;
    /// validation guarantees visited layers are configured.
    #[inline]
    pub fn ladder_count(&self, layer: usize) -> usize {
        layer
            .checked_sub(1)
            .and_then(|i| self.ladder_counts.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Validate the configuration.
    ///
    /// Called by the engine constructor; a failure here is fatal and is
    /// reported before any search begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terminal_depth < 2 || self.terminal_depth % 2 != 0 {
            return Err(ConfigError::InvalidTerminalDepth {
                value: self.terminal_depth,
            });
        }
        if self.branch_keep_count == 0 {
            return Err(ConfigError::InvalidBranchKeepCount {
                value: self.branch_keep_count,
            });
        }
        if !self.hole_penalty.is_finite() || self.hole_penalty < 0.0 {
            return Err(ConfigError::InvalidHolePenalty {
                value: self.hole_penalty,
            });
        }
        for layer in 1..=self.n_layers() {
            match self.ladder_counts.get(layer - 1) {
                None => return Err(ConfigError::MissingLadderCount { layer }),
                Some(0) => {
                    return Err(ConfigError::InvalidLadderCount { layer, value: 0 });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Serializable snapshot of this configuration
    pub fn snapshot(&self) -> SearchConfigSnapshot {
        SearchConfigSnapshot {
            terminal_depth: self.terminal_depth,
            n_layers: self.n_layers(),
            branch_keep_count: self.branch_keep_count,
            max_holes_per_path: self.max_holes_per_path,
            max_consecutive_holes: self.max_consecutive_holes,
            hole_penalty: self.hole_penalty,
            mahalanobis_gate: if self.mahalanobis_gate.is_infinite() {
                None
            } else {
                Some(self.mahalanobis_gate)
            },
            caching: self.caching.name().to_string(),
            ladder_counts: self.ladder_counts.clone(),
        }
    }
}

/// Builder for [`SearchConfig`].
///
/// `terminal_depth` and `ladder_counts` have no sensible universal default
/// and must be supplied; everything else falls back to the module defaults.
#[derive(Debug, Default)]
pub struct SearchConfigBuilder {
    terminal_depth: Option<usize>,
    branch_keep_count: Option<usize>,
    max_holes_per_path: Option<usize>,
    max_consecutive_holes: Option<usize>,
    hole_penalty: Option<f64>,
    mahalanobis_gate: Option<f64>,
    caching: Option<ExtrapolationCaching>,
    ladder_counts: Option<Vec<usize>>,
}

impl SearchConfigBuilder {
    /// Set the root depth `N` (even, two steps per layer)
    pub fn terminal_depth(mut self, depth: usize) -> Self {
        self.terminal_depth = Some(depth);
        self
    }

    /// Set the number of children kept per node
    pub fn branch_keep_count(mut self, count: usize) -> Self {
        self.branch_keep_count = Some(count);
        self
    }

    /// Set the total hole budget per path
    pub fn max_holes_per_path(mut self, holes: usize) -> Self {
        self.max_holes_per_path = Some(holes);
        self
    }

    /// Set the consecutive-hole (layer jump) budget
    pub fn max_consecutive_holes(mut self, holes: usize) -> Self {
        self.max_consecutive_holes = Some(holes);
        self
    }

    /// Set the chi2-equivalent penalty of skipping a layer
    pub fn hole_penalty(mut self, penalty: f64) -> Self {
        self.hole_penalty = Some(penalty);
        self
    }

    /// Set the pre-fit Mahalanobis gate (`f64::INFINITY` disables)
    pub fn mahalanobis_gate(mut self, gate: f64) -> Self {
        self.mahalanobis_gate = Some(gate);
        self
    }

    /// Set the extrapolation caching strategy
    pub fn caching(mut self, caching: ExtrapolationCaching) -> Self {
        self.caching = Some(caching);
        self
    }

    /// Set the per-layer ladder counts (index `layer - 1`)
    pub fn ladder_counts(mut self, counts: Vec<usize>) -> Self {
        self.ladder_counts = Some(counts);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let config = SearchConfig {
            terminal_depth: self.terminal_depth.unwrap_or(0),
            branch_keep_count: self.branch_keep_count.unwrap_or(DEFAULT_BRANCH_KEEP_COUNT),
            max_holes_per_path: self
                .max_holes_per_path
                .unwrap_or(DEFAULT_MAX_HOLES_PER_PATH),
            max_consecutive_holes: self
                .max_consecutive_holes
                .unwrap_or(DEFAULT_MAX_CONSECUTIVE_HOLES),
            hole_penalty: self.hole_penalty.unwrap_or(DEFAULT_HOLE_PENALTY),
            mahalanobis_gate: self.mahalanobis_gate.unwrap_or(f64::INFINITY),
            caching: self.caching.unwrap_or_default(),
            ladder_counts: self.ladder_counts.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Serializable snapshot of a [`SearchConfig`] for debugging and comparison.
#[derive(Debug, Clone, Serialize)]
pub struct SearchConfigSnapshot {
    /// Root depth `N`
    pub terminal_depth: usize,
    /// Number of layers visited (`N/2`)
    pub n_layers: usize,
    /// Children kept per node
    pub branch_keep_count: usize,
    /// Total hole budget per path
    pub max_holes_per_path: usize,
    /// Consecutive-hole budget
    pub max_consecutive_holes: usize,
    /// chi2-equivalent skip penalty
    pub hole_penalty: f64,
    /// Mahalanobis gate, `None` when disabled
    pub mahalanobis_gate: Option<f64>,
    /// Caching strategy name
    pub caching: String,
    /// Ladders per layer
    pub ladder_counts: Vec<usize>,
}

impl SearchConfigSnapshot {
    /// Serialize to a JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serialize to a pretty-printed JSON string
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
