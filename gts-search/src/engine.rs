//! The search engine: epsilon-greedy leaf selection, expansion,
//! and best-h/dead-end propagation over a rooted tree.
//!
//! Values come from the heuristic, not from playouts. The tree itself is
//! the frontier: a leaf is an `Open` node, and one driver step selects a
//! leaf, expands it through the successor generator, and propagates what
//! was learned back toward the root.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gts_task::{CostType, Evaluator, OperatorId, StateId, StateRegistry, Task, INFINITY};

use crate::eliminate::{self, EliminationConfig};
use crate::node_info::NodeStatus;
use crate::space::SearchSpace;
use crate::stats::SearchStatistics;

/// Outcome of one driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    InProgress,
    Solved,
    Failed,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Probability of descending into a uniformly random child instead of
    /// a lowest-best-h one. 0 is pure greedy, 1 is pure uniform.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Re-parent closed nodes when a cheaper path to them is found.
    #[serde(default)]
    pub reopen_closed_nodes: bool,
    /// Hard real-cost ceiling; states reaching it are dead.
    #[serde(default = "default_bound")]
    pub bound: i32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub cost_type: CostType,
    /// Enable median elimination of unpromising arms. The engine-level
    /// `epsilon` keeps its exploration role under this variant.
    #[serde(default)]
    pub elimination: Option<EliminationConfig>,
}

fn default_epsilon() -> f64 {
    0.001
}

fn default_bound() -> i32 {
    INFINITY
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            reopen_closed_nodes: false,
            bound: default_bound(),
            seed: 0,
            cost_type: CostType::Normal,
            elimination: None,
        }
    }
}

pub struct SearchEngine {
    task: Task,
    registry: StateRegistry,
    space: SearchSpace,
    evaluator: Box<dyn Evaluator>,
    rng: ChaCha8Rng,
    cfg: SearchConfig,
    stats: SearchStatistics,
    root: Option<StateId>,
    plan: Option<Vec<OperatorId>>,
}

impl SearchEngine {
    pub fn new(
        task: Task,
        evaluator: Box<dyn Evaluator>,
        cfg: SearchConfig,
    ) -> Result<Self, SearchError> {
        if !(cfg.epsilon.is_finite() && (0.0..=1.0).contains(&cfg.epsilon)) {
            return Err(SearchError::InvalidConfig {
                msg: "epsilon must be in [0, 1]",
            });
        }
        if cfg.bound < 0 {
            return Err(SearchError::InvalidConfig {
                msg: "bound must be >= 0",
            });
        }
        if let Some(elim) = &cfg.elimination {
            if !(elim.delta.is_finite() && elim.delta > 0.0 && elim.delta < 1.0) {
                return Err(SearchError::InvalidConfig {
                    msg: "elimination delta must be in (0, 1)",
                });
            }
            if !(elim.epsilon.is_finite() && elim.epsilon > 0.0) {
                return Err(SearchError::InvalidConfig {
                    msg: "elimination epsilon must be > 0",
                });
            }
        }
        let rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        Ok(Self {
            task,
            registry: StateRegistry::new(),
            space: SearchSpace::new(),
            evaluator,
            rng,
            cfg,
            stats: SearchStatistics::default(),
            root: None,
            plan: None,
        })
    }

    /// Register and open the root with its heuristic value. Must be called
    /// once before [`step`](Self::step).
    pub fn initialize(&mut self) {
        let init = self.registry.initial_state(&self.task);
        self.evaluator
            .notify_initial_state(&self.task, self.registry.lookup(init));
        let h = self
            .evaluator
            .evaluate(&self.task, self.registry.lookup(init), 0);
        self.stats.inc_evaluated();
        self.space.node(init).open_initial(h);
        self.root = Some(init);
    }

    /// One search iteration: select a leaf, expand it, propagate.
    pub fn step(&mut self) -> SearchStatus {
        let Some(root) = self.root else {
            panic!("step() called before initialize()");
        };
        if self.space.get(root).status == NodeStatus::DeadEnd {
            return SearchStatus::Failed;
        }
        let leaf = self.select_next_leaf(root);
        if self.expand(leaf) == SearchStatus::Solved {
            return SearchStatus::Solved;
        }
        self.back_propagate(leaf);
        if self.space.get(root).status == NodeStatus::DeadEnd {
            return SearchStatus::Failed;
        }
        SearchStatus::InProgress
    }

    /// Walk from `root` to an `Open` node, choosing one child per level:
    /// with probability epsilon a uniform child, otherwise a uniform pick
    /// among the children with the lowest `best_h`. Dead children never
    /// participate.
    pub(crate) fn select_next_leaf(&mut self, root: StateId) -> StateId {
        let mut current = root;
        loop {
            let info = self.space.get(current);
            debug_assert!(info.status != NodeStatus::New);
            if info.status == NodeStatus::Open {
                return current;
            }
            if info.children.is_empty() {
                // Every child was re-parented away. Prune and restart the
                // descent above.
                let parent = info.parent;
                {
                    let mut node = self.space.node(current);
                    node.mark_dead_end();
                    node.set_best_h(INFINITY);
                }
                self.stats.inc_dead_ends();
                match parent {
                    Some(p) => {
                        self.back_propagate(current);
                        current = p;
                        continue;
                    }
                    None => return current,
                }
            }
            if self.cfg.elimination.is_some() {
                self.maybe_eliminate(current);
            }

            let info = self.space.get(current);
            let mut live = Vec::new();
            let mut min_h = INFINITY;
            for &child in &info.children {
                let ci = self.space.get(child);
                if ci.status == NodeStatus::DeadEnd || ci.best_h == INFINITY {
                    continue;
                }
                if ci.best_h < min_h {
                    min_h = ci.best_h;
                }
                live.push(child);
            }
            if live.is_empty() {
                // All children dead yet this node survived propagation.
                // Hand it to expansion, which will fail loudly.
                return current;
            }

            let explore = self.rng.gen::<f64>() < self.cfg.epsilon;
            let chosen = if explore {
                live[self.rng.gen_range(0..live.len())]
            } else {
                let best: Vec<StateId> = live
                    .into_iter()
                    .filter(|&c| self.space.get(c).best_h == min_h)
                    .collect();
                best[self.rng.gen_range(0..best.len())]
            };
            if self.cfg.elimination.is_some() {
                self.space.node(chosen).record_visit();
            }
            current = chosen;
        }
    }

    /// Close `state` and generate its successors: open new ones (bound
    /// checking), re-parent closed ones reached more cheaply, and report
    /// `Solved` as soon as a goal state is generated.
    pub(crate) fn expand(&mut self, state: StateId) -> SearchStatus {
        if self.check_goal_and_set_plan(state) {
            return SearchStatus::Solved;
        }
        self.space.node(state).close();
        self.stats.inc_expanded();

        let ops = self.task.applicable_operators(self.registry.lookup(state));
        if ops.is_empty() {
            let mut node = self.space.node(state);
            node.mark_dead_end();
            node.set_best_h(INFINITY);
            self.stats.inc_dead_ends();
            return SearchStatus::InProgress;
        }

        let parent = self.space.link(state);
        for op in ops {
            self.stats.inc_generated();
            let real_cost = self.task.operator(op).cost;
            let adjusted_cost = self.cfg.cost_type.adjusted(real_cost);
            let succ = self.registry.successor_state(&self.task, state, op);
            let (succ_status, succ_real_g_old) = {
                let node = self.space.node(succ);
                (node.status(), node.real_g())
            };

            if succ_status == NodeStatus::New {
                self.space.node(state).add_child(succ);
                let h = self
                    .evaluator
                    .evaluate(&self.task, self.registry.lookup(succ), parent.real_g + real_cost);
                self.stats.inc_evaluated();
                let mut node = self.space.node(succ);
                node.open(parent, op, adjusted_cost, real_cost, h);
                if h >= self.cfg.bound || node.real_g() >= self.cfg.bound {
                    node.mark_dead_end();
                    node.set_best_h(INFINITY);
                }
            } else if succ_status == NodeStatus::Closed && self.cfg.reopen_closed_nodes {
                let new_succ_g = parent.real_g + real_cost;
                if new_succ_g < succ_real_g_old {
                    // Strict improvement under non-negative costs keeps the
                    // parent relation acyclic.
                    self.stats.inc_reopened();
                    let (old_parent, succ_adj_g_old) = {
                        let info = self.space.get(succ);
                        (info.parent, info.g)
                    };
                    if let Some(old_parent) = old_parent {
                        self.space.node(old_parent).remove_child(succ);
                    }
                    self.space.node(state).add_child(succ);
                    self.space.node(succ).reopen(parent, op, adjusted_cost, real_cost);
                    self.forward_propagate_g(
                        succ,
                        succ_adj_g_old - (parent.g + adjusted_cost),
                        succ_real_g_old - new_succ_g,
                    );
                    if let Some(old_parent) = old_parent {
                        self.back_propagate(old_parent);
                    }
                }
            }

            if self.check_goal_and_set_plan(succ) {
                return SearchStatus::Solved;
            }
        }
        SearchStatus::InProgress
    }

    /// Refresh `best_h` and dead-end marks from `state` up to the root.
    /// Stops as soon as a node's `best_h` is unchanged; each full pass is
    /// O(depth) plus the touched child lists.
    pub(crate) fn back_propagate(&mut self, state: StateId) {
        let elim_enabled = self.cfg.elimination.is_some();
        let mut current = state;
        loop {
            let (mut min_h, mut all_dead) = self.live_children_min_h(current);
            if all_dead
                && elim_enabled
                && !self.space.get(current).forgotten_children.is_empty()
            {
                self.space.node(current).restore_forgotten();
                (min_h, all_dead) = self.live_children_min_h(current);
            }

            let info = self.space.get(current);
            let parent = info.parent;
            let already_dead = info.status == NodeStatus::DeadEnd;
            let prev_h = info.best_h;

            if all_dead {
                if !already_dead {
                    let mut node = self.space.node(current);
                    node.mark_dead_end();
                    node.set_best_h(INFINITY);
                    self.stats.inc_dead_ends();
                }
            } else if prev_h == min_h {
                return;
            } else {
                self.space.node(current).set_best_h(min_h);
            }

            if elim_enabled {
                let best_h = self.space.get(current).best_h;
                if best_h != INFINITY {
                    self.space.node(current).add_reward(best_h as i64);
                }
            }

            match parent {
                Some(p) => current = p,
                None => return,
            }
        }
    }

    /// Shift both path costs across the subtree of `state` after it adopted
    /// a cheaper parent. The walk descends only through closed nodes: below
    /// an open node nothing is materialized yet, and dead subtrees are
    /// already pruned.
    pub(crate) fn forward_propagate_g(&mut self, state: StateId, g_diff: i32, real_g_diff: i32) {
        let mut stack = vec![state];
        while let Some(id) = stack.pop() {
            let children = self.space.get(id).children.to_vec();
            for child in children {
                self.space.node(child).update_g(g_diff, real_g_diff);
                if self.space.get(child).status == NodeStatus::Closed {
                    stack.push(child);
                }
            }
        }
    }

    fn live_children_min_h(&self, id: StateId) -> (i32, bool) {
        let info = self.space.get(id);
        let mut min_h = INFINITY;
        let mut all_dead = true;
        for &child in &info.children {
            let ci = self.space.get(child);
            if ci.status == NodeStatus::DeadEnd || ci.best_h == INFINITY {
                continue;
            }
            min_h = min_h.min(ci.best_h);
            all_dead = false;
        }
        (min_h, all_dead)
    }

    /// Run one elimination round on `id` if every live child has been
    /// visited often enough for the node's current level: children whose
    /// accumulated value per visit is worse than the median are set aside,
    /// except those matching the node's own `best_h`.
    fn maybe_eliminate(&mut self, id: StateId) {
        let Some(elim) = self.cfg.elimination else {
            return;
        };
        let info = self.space.get(id);
        let level = info.elim_level;
        let parent_best_h = info.best_h;

        let mut live = Vec::new();
        let mut min_visits = u32::MAX;
        for &child in &info.children {
            let ci = self.space.get(child);
            if ci.status == NodeStatus::DeadEnd || ci.best_h == INFINITY {
                continue;
            }
            min_visits = min_visits.min(ci.visited);
            live.push(child);
        }
        if live.len() < 2 || (min_visits as f64) <= eliminate::visit_threshold(&elim, level) {
            return;
        }

        let ratios: Vec<(StateId, f64)> = live
            .iter()
            .map(|&child| {
                let ci = self.space.get(child);
                (child, ci.reward_sum as f64 / ci.visited as f64)
            })
            .collect();
        let mut sample: Vec<f64> = ratios.iter().map(|&(_, r)| r).collect();
        let cut = eliminate::median(&mut sample);

        for (child, ratio) in ratios {
            let keep = ratio <= cut || self.space.get(child).best_h == parent_best_h;
            if keep {
                self.space.node(child).reset_visits();
            } else {
                self.space.node(id).forget_child(child);
            }
        }
        self.space.node(id).bump_elim_level();
    }

    fn check_goal_and_set_plan(&mut self, state: StateId) -> bool {
        if self.task.is_goal(self.registry.lookup(state)) {
            self.plan = Some(self.space.trace_path(state));
            return true;
        }
        false
    }

    /// The plan found by the last `Solved` step, root to goal.
    pub fn plan(&self) -> Option<&[OperatorId]> {
        self.plan.as_deref()
    }

    /// Real cost of the found plan.
    pub fn plan_cost(&self) -> Option<i32> {
        self.plan
            .as_ref()
            .map(|plan| plan.iter().map(|&op| self.task.operator(op).cost).sum())
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.stats
    }

    pub fn print_statistics(&self) {
        println!("{}", self.stats);
        println!("Registered {} state(s).", self.registry.num_states());
        println!("Search tree holds {} node(s).", self.space.num_nodes());
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn registry(&self) -> &StateRegistry {
        &self.registry
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    pub fn root(&self) -> Option<StateId> {
        self.root
    }
}
