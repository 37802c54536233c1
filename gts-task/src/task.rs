//! Ground planning tasks: finite-domain variables, operators, goal test.
//!
//! Tasks are plain data. The YAML schema accepted by [`Task::load`] mirrors
//! the struct layout one-to-one, so a task file is just a serialized `Task`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index of an operator in [`Task::operators`].
///
/// "No operator" (the root's creating operator) is `Option<OperatorId>::None`;
/// the id itself is always a real operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperatorId(pub u32);

impl OperatorId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single assignment `var = value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub var: usize,
    pub value: u16,
}

/// A finite-domain state variable with `domain_size` values `0..domain_size`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub domain_size: u16,
}

/// A ground operator. Applicable when every precondition holds; applying it
/// rewrites each effect variable. `cost` is the real (untransformed) cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    pub name: String,
    #[serde(default)]
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Fact>,
    #[serde(default)]
    pub cost: i32,
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to read task file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid task: {msg}")]
    Invalid { msg: String },
}

/// A complete ground planning task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub variables: Vec<Variable>,
    pub operators: Vec<Operator>,
    /// One value per variable.
    pub initial_values: Vec<u16>,
    /// Conjunctive goal.
    pub goal: Vec<Fact>,
}

impl Task {
    /// Load a task from a YAML file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TaskError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a task from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, TaskError> {
        let task: Task = serde_yaml::from_str(yaml)?;
        task.validate()?;
        Ok(task)
    }

    /// Check structural consistency: fact bounds, value ranges, costs.
    pub fn validate(&self) -> Result<(), TaskError> {
        let invalid = |msg: String| Err(TaskError::Invalid { msg });
        if self.initial_values.len() != self.variables.len() {
            return invalid(format!(
                "initial state has {} values for {} variables",
                self.initial_values.len(),
                self.variables.len()
            ));
        }
        for (var, &value) in self.initial_values.iter().enumerate() {
            if value >= self.variables[var].domain_size {
                return invalid(format!("initial value {value} out of range for var {var}"));
            }
        }
        let check_fact = |fact: &Fact, ctx: &str| {
            if fact.var >= self.variables.len() {
                return invalid(format!("{ctx}: unknown variable {}", fact.var));
            }
            if fact.value >= self.variables[fact.var].domain_size {
                return invalid(format!(
                    "{ctx}: value {} out of range for var {}",
                    fact.value, fact.var
                ));
            }
            Ok(())
        };
        for fact in &self.goal {
            check_fact(fact, "goal")?;
        }
        for op in &self.operators {
            if op.cost < 0 {
                return invalid(format!("operator {} has negative cost {}", op.name, op.cost));
            }
            if op.effects.is_empty() {
                return invalid(format!("operator {} has no effects", op.name));
            }
            for fact in &op.preconditions {
                check_fact(fact, &format!("operator {} precondition", op.name))?;
            }
            for fact in &op.effects {
                check_fact(fact, &format!("operator {} effect", op.name))?;
            }
        }
        Ok(())
    }

    pub fn operator(&self, id: OperatorId) -> &Operator {
        &self.operators[id.index()]
    }

    pub fn is_applicable(&self, id: OperatorId, state: &[u16]) -> bool {
        self.operator(id)
            .preconditions
            .iter()
            .all(|fact| state[fact.var] == fact.value)
    }

    /// Operators applicable in `state`, in operator-index order.
    pub fn applicable_operators(&self, state: &[u16]) -> Vec<OperatorId> {
        (0..self.operators.len() as u32)
            .map(OperatorId)
            .filter(|&id| self.is_applicable(id, state))
            .collect()
    }

    pub fn is_goal(&self, state: &[u16]) -> bool {
        self.goal.iter().all(|fact| state[fact.var] == fact.value)
    }
}
