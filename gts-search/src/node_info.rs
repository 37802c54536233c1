//! Per-state node records.
//!
//! One record per reachable state, materialized lazily on first access and
//! never freed while the engine lives. All tree structure (parent pointers,
//! child lists) lives here; states themselves stay in the registry.

use gts_task::{OperatorId, StateId, INFINITY};

/// Lifecycle of a node record.
///
/// `New -> Open` on first opening, `Open -> Closed` on expansion,
/// `DeadEnd` from anywhere. Reopening takes `Open` or `Closed` back to
/// `Open` when a cheaper parent is adopted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NodeStatus {
    #[default]
    New,
    Open,
    Closed,
    DeadEnd,
}

#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub status: NodeStatus,
    /// Sum of adjusted operator costs on the current best known path from
    /// the root. Meaningless (-1) while `New`.
    pub g: i32,
    /// Sum of real operator costs on that same path. Meaningless (-1)
    /// while `New`.
    pub real_g: i32,
    /// Parent in the current tree; `None` iff this is the root.
    pub parent: Option<StateId>,
    /// Operator that produced this state from its parent; `None` iff root.
    pub creating_operator: Option<OperatorId>,
    /// Lowest heuristic estimate seen in this node's subtree; [`INFINITY`]
    /// while `New` and for proven dead ends.
    pub best_h: i32,
    /// Currently-live children, in discovery order.
    pub children: Vec<StateId>,

    // Arm-elimination bookkeeping. Untouched unless elimination is enabled.
    pub visited: u32,
    pub reward_sum: i64,
    pub elim_level: u32,
    pub forgotten_children: Vec<StateId>,
}

impl Default for NodeInfo {
    fn default() -> Self {
        Self {
            status: NodeStatus::New,
            g: -1,
            real_g: -1,
            parent: None,
            creating_operator: None,
            best_h: INFINITY,
            children: Vec::new(),
            visited: 0,
            reward_sum: 0,
            elim_level: 0,
            forgotten_children: Vec::new(),
        }
    }
}
