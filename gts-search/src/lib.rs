//! gts-search: epsilon-greedy heuristic tree search for classical planning.
//!
//! The engine grows a rooted tree over registered states. Each driver step
//! selects an open leaf by an exploration/exploitation rule over per-node
//! best heuristic estimates, expands it through the task's successor
//! generator, and back-propagates dead-end and best-h information. With
//! `reopen_closed_nodes` the tree re-parents nodes reached on cheaper
//! paths; with `elimination` it additionally prunes unpromising arms.

pub mod eliminate;
pub mod engine;
pub mod node_info;
pub mod space;
pub mod stats;

pub use eliminate::EliminationConfig;
pub use engine::{SearchConfig, SearchEngine, SearchError, SearchStatus};
pub use node_info::{NodeInfo, NodeStatus};
pub use space::{ParentLink, SearchNode, SearchSpace};
pub use stats::SearchStatistics;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
