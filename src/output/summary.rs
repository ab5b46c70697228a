//! Result aggregation and exit policy

use crate::models::{JobOutcome, RunStats};

/// Totals across every job in a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregateTotals {
    /// Summed statistics of all completed jobs
    pub stats: RunStats,
    pub jobs: usize,
    pub passed: usize,
    pub engine_failures: usize,
}

impl AggregateTotals {
    pub fn from_outcomes(outcomes: &[JobOutcome]) -> Self {
        let mut totals = Self {
            jobs: outcomes.len(),
            ..Self::default()
        };

        for outcome in outcomes {
            match outcome.stats() {
                Some(stats) => totals.stats.merge(stats),
                None => totals.engine_failures += 1,
            }
            if outcome.is_passed() {
                totals.passed += 1;
            }
        }

        totals
    }

    /// Failed requests, failed assertions and engine errors all fail the run
    pub fn is_success(&self) -> bool {
        !self.stats.has_failures() && self.engine_failures == 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
