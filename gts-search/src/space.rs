//! Shared node storage and the short-lived node handle.
//!
//! [`SearchSpace`] keys [`NodeInfo`] records by state id. Mutations go
//! through [`SearchNode`], a handle over one record that checks the status
//! precondition of every lifecycle transition. Handles must not be held
//! across operations that touch other records.

use rustc_hash::FxHashMap;

use gts_task::{OperatorId, StateId};

use crate::node_info::{NodeInfo, NodeStatus};

/// Snapshot of the parent-side fields needed to (re)open a child.
/// Taken before the child handle is created, so parent and child records
/// are never borrowed at once.
#[derive(Debug, Clone, Copy)]
pub struct ParentLink {
    pub id: StateId,
    pub g: i32,
    pub real_g: i32,
}

#[derive(Default)]
pub struct SearchSpace {
    infos: FxHashMap<StateId, NodeInfo>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.infos.len()
    }

    /// Mutable handle over the record for `id`, materializing it on first
    /// access.
    pub fn node(&mut self, id: StateId) -> SearchNode<'_> {
        SearchNode {
            id,
            info: self.infos.entry(id).or_default(),
        }
    }

    /// Read access to an existing record. A dangling id means the tree
    /// structure is corrupt, which is fatal.
    pub fn get(&self, id: StateId) -> &NodeInfo {
        match self.infos.get(&id) {
            Some(info) => info,
            None => panic!("no node record for state {id:?}"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &NodeInfo)> {
        self.infos.iter().map(|(&id, info)| (id, info))
    }

    /// Parent-side snapshot for opening children of `id`.
    pub fn link(&self, id: StateId) -> ParentLink {
        let info = self.get(id);
        ParentLink {
            id,
            g: info.g,
            real_g: info.real_g,
        }
    }

    /// Operator sequence from the root to `state`, following parent
    /// pointers. Panics if the walk does not terminate within the number
    /// of known records; that means the parent relation has a cycle.
    pub fn trace_path(&self, state: StateId) -> Vec<OperatorId> {
        let mut path = Vec::new();
        let mut current = state;
        let step_bound = self.infos.len() + 1;
        for _ in 0..step_bound {
            let info = self.get(current);
            match (info.creating_operator, info.parent) {
                (None, None) => {
                    path.reverse();
                    return path;
                }
                (Some(op), Some(parent)) => {
                    path.push(op);
                    current = parent;
                }
                _ => panic!("state {current:?} has a parent without an operator (or vice versa)"),
            }
        }
        panic!("path trace exceeded {step_bound} steps; parent pointers form a cycle");
    }
}

/// Mutable view over one `(state, record)` pair.
pub struct SearchNode<'a> {
    id: StateId,
    info: &'a mut NodeInfo,
}

impl SearchNode<'_> {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn status(&self) -> NodeStatus {
        self.info.status
    }

    pub fn is_new(&self) -> bool {
        self.info.status == NodeStatus::New
    }

    pub fn is_open(&self) -> bool {
        self.info.status == NodeStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.info.status == NodeStatus::Closed
    }

    pub fn is_dead_end(&self) -> bool {
        self.info.status == NodeStatus::DeadEnd
    }

    pub fn g(&self) -> i32 {
        assert!(self.info.g >= 0, "g read on an unopened node {:?}", self.id);
        self.info.g
    }

    pub fn real_g(&self) -> i32 {
        self.info.real_g
    }

    pub fn best_h(&self) -> i32 {
        self.info.best_h
    }

    pub fn set_best_h(&mut self, best_h: i32) {
        self.info.best_h = best_h;
    }

    pub fn parent(&self) -> Option<StateId> {
        self.info.parent
    }

    pub fn creating_operator(&self) -> Option<OperatorId> {
        self.info.creating_operator
    }

    pub fn children(&self) -> &[StateId] {
        &self.info.children
    }

    /// `New -> Open` for the root: zero costs, no parent.
    pub fn open_initial(&mut self, h: i32) {
        assert!(self.is_new(), "open_initial on non-new node {:?}", self.id);
        self.info.status = NodeStatus::Open;
        self.info.g = 0;
        self.info.real_g = 0;
        self.info.parent = None;
        self.info.creating_operator = None;
        self.info.best_h = h;
    }

    /// `New -> Open` under `parent` via `op`.
    pub fn open(&mut self, parent: ParentLink, op: OperatorId, adjusted_cost: i32, real_cost: i32, h: i32) {
        assert!(self.is_new(), "open on non-new node {:?}", self.id);
        assert!(parent.id != self.id, "state {:?} cannot be its own parent", self.id);
        self.info.status = NodeStatus::Open;
        self.info.g = parent.g + adjusted_cost;
        self.info.real_g = parent.real_g + real_cost;
        self.info.parent = Some(parent.id);
        self.info.creating_operator = Some(op);
        self.info.best_h = h;
    }

    /// `{Open, Closed} -> Open`: adopt a cheaper parent. `best_h` is
    /// deliberately left as refined by propagation.
    pub fn reopen(&mut self, parent: ParentLink, op: OperatorId, adjusted_cost: i32, real_cost: i32) {
        assert!(
            self.is_open() || self.is_closed(),
            "reopen on node {:?} in status {:?}",
            self.id,
            self.info.status
        );
        assert!(parent.id != self.id, "state {:?} cannot be its own parent", self.id);
        self.info.status = NodeStatus::Open;
        self.info.g = parent.g + adjusted_cost;
        self.info.real_g = parent.real_g + real_cost;
        self.info.parent = Some(parent.id);
        self.info.creating_operator = Some(op);
    }

    pub fn close(&mut self) {
        assert!(self.is_open(), "close on non-open node {:?}", self.id);
        self.info.status = NodeStatus::Closed;
    }

    pub fn mark_dead_end(&mut self) {
        self.info.status = NodeStatus::DeadEnd;
    }

    /// Shift both path costs down by the given savings (negative values
    /// shift up). Used when an ancestor adopted a cheaper parent.
    pub fn update_g(&mut self, g_diff: i32, real_g_diff: i32) {
        self.info.g -= g_diff;
        self.info.real_g -= real_g_diff;
    }

    /// Append `child` unless it is already present or is this node's own
    /// parent.
    pub fn add_child(&mut self, child: StateId) {
        if Some(child) == self.info.parent || self.info.children.contains(&child) {
            return;
        }
        self.info.children.push(child);
    }

    /// Remove the first occurrence of `child`, if any.
    pub fn remove_child(&mut self, child: StateId) {
        if let Some(pos) = self.info.children.iter().position(|&c| c == child) {
            self.info.children.remove(pos);
        }
    }

    pub fn record_visit(&mut self) {
        self.info.visited += 1;
    }

    pub fn reset_visits(&mut self) {
        self.info.visited = 0;
    }

    pub fn add_reward(&mut self, reward: i64) {
        self.info.reward_sum = self.info.reward_sum.saturating_add(reward);
    }

    pub fn bump_elim_level(&mut self) {
        self.info.elim_level += 1;
    }

    /// Move `child` from the live child list to the forgotten set.
    pub fn forget_child(&mut self, child: StateId) {
        self.remove_child(child);
        if !self.info.forgotten_children.contains(&child) {
            self.info.forgotten_children.push(child);
        }
    }

    /// Re-admit every forgotten child.
    pub fn restore_forgotten(&mut self) {
        let forgotten = std::mem::take(&mut self.info.forgotten_children);
        for child in forgotten {
            self.add_child(child);
        }
    }
}
