//! Operator cost transformations.
//!
//! Path costs are tracked twice: `g` over transformed ("adjusted") costs and
//! `real_g` over the untransformed operator costs. The transformation is a
//! host-level choice, so it lives here rather than in the search crate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    /// Use operator costs as given.
    #[default]
    Normal,
    /// Unit costs: every operator counts 1.
    One,
    /// Unit-shifted costs: operator cost plus 1, so zero-cost operators
    /// still lengthen the path.
    PlusOne,
}

impl CostType {
    pub fn adjusted(self, cost: i32) -> i32 {
        match self {
            CostType::Normal => cost,
            CostType::One => 1,
            CostType::PlusOne => cost + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustments() {
        assert_eq!(CostType::Normal.adjusted(7), 7);
        assert_eq!(CostType::One.adjusted(7), 1);
        assert_eq!(CostType::One.adjusted(0), 1);
        assert_eq!(CostType::PlusOne.adjusted(7), 8);
        assert_eq!(CostType::PlusOne.adjusted(0), 1);
    }

    #[test]
    fn serde_names_are_snake_case() {
        let ct: CostType = serde_yaml::from_str("plus_one").unwrap();
        assert_eq!(ct, CostType::PlusOne);
    }
}
