//! Node arena for the search tree
//!
//! All nodes of the trees grown for one event live in a [`StateArena`] and
//! are addressed by [`NodeId`] indices. Parent links are indices too, so
//! clearing the arena between events can never leave a dangling reference;
//! the backing storage is retained across events to avoid reallocation.

use crate::extrapolation::TrackState;

/// Stable handle of a node inside a [`StateArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Index into the arena's storage
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

/// One vertex of a search tree.
///
/// `depth` counts down from the configured terminal depth `N` at the root to
/// 0 at the leaves. Odd depths are ordinary layer steps, even depths are
/// overlap sub-steps; a child's depth is always its parent's minus one.
#[derive(Debug, Clone)]
pub struct StateNode {
    /// Remaining depth, `N` at the root, 0 at a terminal node
    pub depth: usize,
    /// Parent node, `None` for a root
    pub parent: Option<NodeId>,
    /// Hit assigned at this step, `None` encodes a hole / skipped step
    pub hit: Option<usize>,
    /// State estimate on this node's plane. The root carries the seed state;
    /// a fitted node carries its posterior; a hole carries nothing and
    /// inherits from the nearest ancestor.
    pub state: Option<TrackState>,
    /// Intermediate extrapolation cached while this node's children were
    /// expanded (shared reference surface or first-hit plane)
    pub cached_state: Option<TrackState>,
    /// Running chi2 total of the path from the root through this node
    pub chi2: f64,
    /// Ranking score used during child selection
    pub weight: f64,
    /// Whether the state was extrapolated onto this node's plane
    pub advanced: bool,
    /// Whether the hit was folded into the state; implies `advanced`
    pub fitted: bool,
    /// Ordinary-layer holes on the path so far
    pub hole_count: usize,
    /// Current run of consecutive ordinary-layer holes
    pub consecutive_holes: usize,
}

impl StateNode {
    /// Whether this node sits on an overlap sub-step depth
    #[inline]
    pub fn is_overlap_step(&self) -> bool {
        self.depth % 2 == 0
    }

    /// Physical layer this node's depth maps to (1-based)
    #[inline]
    pub fn layer(&self) -> usize {
        self.depth / 2 + 1
    }

    /// Whether a cached intermediate extrapolation is present
    #[inline]
    pub fn has_cached_extrapolation(&self) -> bool {
        self.cached_state.is_some()
    }
}

/// Layer a given search depth maps to (1-based).
#[inline]
pub fn layer_of_depth(depth: usize) -> usize {
    depth / 2 + 1
}

/// Whether a search depth is an overlap sub-step.
#[inline]
pub fn is_overlap_depth(depth: usize) -> bool {
    depth % 2 == 0
}

/// Arena owning every node of the trees grown for one event.
#[derive(Debug, Clone, Default)]
pub struct StateArena {
    nodes: Vec<StateNode>,
}

impl StateArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Drop all nodes but keep the allocation for the next event
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Number of live nodes
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node and return its handle
    pub fn push(&mut self, node: StateNode) -> NodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a root node at the given depth carrying a seed state
    pub fn push_root(&mut self, depth: usize, seed_state: TrackState) -> NodeId {
        self.push(StateNode {
            depth,
            parent: None,
            hit: None,
            state: Some(seed_state),
            cached_state: None,
            chi2: 0.0,
            weight: 0.0,
            advanced: false,
            fitted: false,
            hole_count: 0,
            consecutive_holes: 0,
        })
    }

    /// Borrow a node
    #[inline]
    pub fn get(&self, id: NodeId) -> &StateNode {
        &self.nodes[id.index()]
    }

    /// Mutably borrow a node
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut StateNode {
        &mut self.nodes[id.index()]
    }

    /// Iterator over all live nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &StateNode> {
        self.nodes.iter()
    }

    /// Iterator over a node and its ancestors up to the root
    pub fn path_to_root(&self, id: NodeId) -> PathToRoot<'_> {
        PathToRoot {
            arena: self,
            next: Some(id),
        }
    }

    /// State estimate governing a node: its own if present, otherwise the
    /// nearest ancestor's.
    ///
    /// Cheap because a hole never advances the state, so the walk is short;
    /// the root always carries the seed state, so a well-formed tree always
    /// yields `Some`.
    pub fn inherited_state(&self, id: NodeId) -> Option<&TrackState> {
        self.path_to_root(id)
            .find_map(|nid| self.get(nid).state.as_ref())
    }
}

/// Iterator walking parent links from a node to its root.
pub struct PathToRoot<'a> {
    arena: &'a StateArena,
    next: Option<NodeId>,
}

impl Iterator for PathToRoot<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.arena.get(current).parent;
        Some(current)
    }
}
