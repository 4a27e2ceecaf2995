//! Search-tree machinery
//!
//! - [`arena`] - index-addressed node storage, reused across events
//! - [`selector`] - candidate lookup per node and target depth
//! - [`search`] - the advance/fit/select/recurse engine
//! - [`result`] - finalization of terminal nodes into track candidates

pub mod arena;
pub mod result;
pub mod search;
pub mod selector;

pub use arena::{NodeId, StateArena, StateNode};
pub use result::TrackCandidate;
pub use search::{search_seeds, TreeSearchEngine};
pub use selector::CandidateSelector;
