//! Event counters for a search run.

use std::fmt;

#[derive(Debug, Default, Clone, Copy)]
pub struct SearchStatistics {
    /// Successor states produced by operator application.
    pub generated: u64,
    /// Heuristic evaluations.
    pub evaluated: u64,
    /// Nodes closed by expansion.
    pub expanded: u64,
    /// Closed nodes re-parented onto a cheaper path.
    pub reopened: u64,
    /// Nodes proven dead, by exhaustion or propagation.
    pub dead_ends: u64,
}

impl SearchStatistics {
    pub fn inc_generated(&mut self) {
        self.generated += 1;
    }

    pub fn inc_evaluated(&mut self) {
        self.evaluated += 1;
    }

    pub fn inc_expanded(&mut self) {
        self.expanded += 1;
    }

    pub fn inc_reopened(&mut self) {
        self.reopened += 1;
    }

    pub fn inc_dead_ends(&mut self) {
        self.dead_ends += 1;
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generated {} state(s).", self.generated)?;
        writeln!(f, "Evaluated {} state(s).", self.evaluated)?;
        writeln!(f, "Expanded {} state(s).", self.expanded)?;
        writeln!(f, "Reopened {} state(s).", self.reopened)?;
        write!(f, "Dead ends: {} state(s).", self.dead_ends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let mut stats = SearchStatistics::default();
        assert_eq!(stats.expanded, 0);
        stats.inc_expanded();
        stats.inc_expanded();
        stats.inc_dead_ends();
        assert_eq!(stats.expanded, 2);
        assert_eq!(stats.dead_ends, 1);
    }

    #[test]
    fn report_mentions_every_counter() {
        let stats = SearchStatistics {
            generated: 5,
            evaluated: 4,
            expanded: 3,
            reopened: 2,
            dead_ends: 1,
        };
        let report = stats.to_string();
        for needle in ["Generated 5", "Evaluated 4", "Expanded 3", "Reopened 2", "Dead ends: 1"] {
            assert!(report.contains(needle), "missing {needle:?} in {report:?}");
        }
    }
}
