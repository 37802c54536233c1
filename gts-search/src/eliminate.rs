//! Median elimination of unpromising arms.
//!
//! Nodes track per-child visit counts and accumulated value. Once every
//! live child of a node has been sampled often enough for the node's
//! current elimination level, the worse half (by accumulated value per
//! visit) is moved aside, and the level rises so the next round demands
//! more samples at a tighter accuracy.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EliminationConfig {
    /// Confidence parameter, in (0, 1).
    pub delta: f64,
    /// Accuracy coefficient, > 0.
    pub epsilon: f64,
}

/// Accuracy and confidence at elimination level `level`: the accuracy
/// shrinks by 3/4 and the confidence budget halves per round, keeping the
/// totals summable.
pub(crate) fn level_coefficients(cfg: &EliminationConfig, level: u32) -> (f64, f64) {
    let eps = cfg.epsilon * 0.75f64.powi(level as i32) / 4.0;
    let delta = cfg.delta * 0.5f64.powi(level as i32) / 2.0;
    (eps, delta)
}

/// Visit count every live child must exceed before a node may run an
/// elimination round at `level`.
pub(crate) fn visit_threshold(cfg: &EliminationConfig, level: u32) -> f64 {
    let (eps, delta) = level_coefficients(cfg, level);
    1.0 + 1.0 / ((eps / 2.0).powi(2) * (3.0 / delta).ln())
}

/// Lower median of `values` (sorted in place).
pub(crate) fn median(values: &mut [f64]) -> f64 {
    assert!(!values.is_empty(), "median of an empty sample");
    values.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN rewards"));
    values[(values.len() - 1) / 2]
}
