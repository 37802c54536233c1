//! Heuristic evaluators.
//!
//! An evaluator estimates remaining cost from a state. [`INFINITY`] is a
//! normal return value meaning "provably no goal reachable from here", not
//! an error. Arithmetic on heuristic values must saturate at `INFINITY`.

use rustc_hash::FxHashMap;

use crate::task::Task;

/// Sentinel for "dead" / "unreachable". Callers compare against this value
/// explicitly; never add to it.
pub const INFINITY: i32 = i32::MAX;

pub trait Evaluator {
    /// Called once with the initial state before the search starts.
    fn notify_initial_state(&mut self, _task: &Task, _state: &[u16]) {}

    /// Estimate of remaining cost from `state`; `g` is the real path cost
    /// at which the state was reached.
    fn evaluate(&mut self, task: &Task, state: &[u16], g: i32) -> i32;
}

/// Reports 0 on goal states and the cheapest operator cost otherwise.
#[derive(Default)]
pub struct BlindEvaluator {
    min_cost: i32,
}

impl Evaluator for BlindEvaluator {
    fn notify_initial_state(&mut self, task: &Task, _state: &[u16]) {
        self.min_cost = task.operators.iter().map(|op| op.cost).min().unwrap_or(0);
    }

    fn evaluate(&mut self, task: &Task, state: &[u16], _g: i32) -> i32 {
        if task.is_goal(state) {
            0
        } else {
            self.min_cost
        }
    }
}

/// Number of unsatisfied goal facts.
#[derive(Default)]
pub struct GoalCountEvaluator;

impl Evaluator for GoalCountEvaluator {
    fn evaluate(&mut self, task: &Task, state: &[u16], _g: i32) -> i32 {
        task.goal
            .iter()
            .filter(|fact| state[fact.var] != fact.value)
            .count() as i32
    }
}

/// Explicit per-state values, keyed by the full variable assignment.
/// States not in the table get `default`.
pub struct TableEvaluator {
    values: FxHashMap<Vec<u16>, i32>,
    default: i32,
}

impl TableEvaluator {
    pub fn new(default: i32) -> Self {
        Self {
            values: FxHashMap::default(),
            default,
        }
    }

    pub fn insert(&mut self, state: &[u16], h: i32) -> &mut Self {
        self.values.insert(state.to_vec(), h);
        self
    }
}

impl Evaluator for TableEvaluator {
    fn evaluate(&mut self, _task: &Task, state: &[u16], _g: i32) -> i32 {
        self.values.get(state).copied().unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders;

    #[test]
    fn blind_is_zero_on_goals_and_min_cost_elsewhere() {
        let task = builders::diamond(2, 1, 1, 1);
        let mut blind = BlindEvaluator::default();
        blind.notify_initial_state(&task, &task.initial_values);
        assert_eq!(blind.evaluate(&task, &[0], 0), 1);
        assert_eq!(blind.evaluate(&task, &[3], 0), 0);
    }

    #[test]
    fn goal_count_counts_unsatisfied_facts() {
        let task = builders::grid(3, 3);
        let mut h = GoalCountEvaluator;
        assert_eq!(h.evaluate(&task, &[0, 0], 0), 2);
        assert_eq!(h.evaluate(&task, &[2, 0], 0), 1);
        assert_eq!(h.evaluate(&task, &[2, 2], 0), 0);
    }

    #[test]
    fn table_falls_back_to_default() {
        let task = builders::chain(2);
        let mut h = TableEvaluator::new(INFINITY);
        h.insert(&[0], 2).insert(&[1], 1);
        assert_eq!(h.evaluate(&task, &[0], 0), 2);
        assert_eq!(h.evaluate(&task, &[2], 0), INFINITY);
    }
}
