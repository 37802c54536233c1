//! Deterministic generated tasks for tests, benches, and the CLI demo.

use crate::task::{Fact, Operator, Task, Variable};

/// Linear chain `0 -> 1 -> ... -> len`, one unit-cost operator per step,
/// goal at the end.
pub fn chain(len: u16) -> Task {
    let operators = (0..len)
        .map(|i| Operator {
            name: format!("step-{i}"),
            preconditions: vec![Fact { var: 0, value: i }],
            effects: vec![Fact {
                var: 0,
                value: i + 1,
            }],
            cost: 1,
        })
        .collect();
    Task {
        name: format!("chain-{len}"),
        variables: vec![Variable {
            name: "at".to_string(),
            domain_size: len + 1,
        }],
        operators,
        initial_values: vec![0],
        goal: vec![Fact { var: 0, value: len }],
    }
}

/// Diamond over positions A=0, B=1, C=2, D=3 with edges A->B, A->C, B->D,
/// C->D at the given costs; goal is D. Operator order: ab, ac, bd, cd.
pub fn diamond(cost_ab: i32, cost_ac: i32, cost_bd: i32, cost_cd: i32) -> Task {
    let edge = |name: &str, from: u16, to: u16, cost: i32| Operator {
        name: name.to_string(),
        preconditions: vec![Fact { var: 0, value: from }],
        effects: vec![Fact { var: 0, value: to }],
        cost,
    };
    Task {
        name: "diamond".to_string(),
        variables: vec![Variable {
            name: "at".to_string(),
            domain_size: 4,
        }],
        operators: vec![
            edge("ab", 0, 1, cost_ab),
            edge("ac", 0, 2, cost_ac),
            edge("bd", 1, 3, cost_bd),
            edge("cd", 2, 3, cost_cd),
        ],
        initial_values: vec![0],
        goal: vec![Fact { var: 0, value: 3 }],
    }
}

/// `w x h` grid walk from (0,0) to (w-1,h-1) with unit-cost right/up moves.
/// For each cell the "right" operator precedes the "up" operator.
pub fn grid(w: u16, h: u16) -> Task {
    assert!(w > 0 && h > 0, "grid needs at least one cell");
    let mut operators = Vec::new();
    for x in 0..w {
        for y in 0..h {
            if x + 1 < w {
                operators.push(Operator {
                    name: format!("right-{x}-{y}"),
                    preconditions: vec![Fact { var: 0, value: x }, Fact { var: 1, value: y }],
                    effects: vec![Fact { var: 0, value: x + 1 }],
                    cost: 1,
                });
            }
            if y + 1 < h {
                operators.push(Operator {
                    name: format!("up-{x}-{y}"),
                    preconditions: vec![Fact { var: 0, value: x }, Fact { var: 1, value: y }],
                    effects: vec![Fact { var: 1, value: y + 1 }],
                    cost: 1,
                });
            }
        }
    }
    Task {
        name: format!("grid-{w}x{h}"),
        variables: vec![
            Variable {
                name: "x".to_string(),
                domain_size: w,
            },
            Variable {
                name: "y".to_string(),
                domain_size: h,
            },
        ],
        operators,
        initial_values: vec![0, 0],
        goal: vec![
            Fact {
                var: 0,
                value: w - 1,
            },
            Fact {
                var: 1,
                value: h - 1,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_produce_valid_tasks() {
        chain(5).validate().unwrap();
        diamond(2, 1, 1, 1).validate().unwrap();
        grid(4, 3).validate().unwrap();
    }

    #[test]
    fn chain_goal_is_at_the_end() {
        let task = chain(3);
        assert!(!task.is_goal(&[0]));
        assert!(task.is_goal(&[3]));
        assert_eq!(task.operators.len(), 3);
    }

    #[test]
    fn grid_moves_stay_in_bounds() {
        let task = grid(2, 2);
        // Corner cell (1,1) is the goal and has no applicable moves.
        assert!(task.applicable_operators(&[1, 1]).is_empty());
        assert_eq!(task.applicable_operators(&[0, 0]).len(), 2);
    }
}
