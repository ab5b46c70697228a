//! Job outcome models
//!
//! Defines per-run statistics and the settled result of a single job.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::EngineError;

/// Request and assertion counters for one collection run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub requests_total: u64,
    pub requests_failed: u64,
    pub assertions_total: u64,
    pub assertions_failed: u64,
}

impl RunStats {
    pub fn new(
        requests_total: u64,
        requests_failed: u64,
        assertions_total: u64,
        assertions_failed: u64,
    ) -> Self {
        Self {
            requests_total,
            requests_failed,
            assertions_total,
            assertions_failed,
        }
    }

    /// Failed counts never exceed their totals
    pub fn is_consistent(&self) -> bool {
        self.requests_failed <= self.requests_total
            && self.assertions_failed <= self.assertions_total
    }

    pub fn has_failures(&self) -> bool {
        self.requests_failed > 0 || self.assertions_failed > 0
    }

    /// Add another run's counters, saturating at `u64::MAX`
    pub fn merge(&mut self, other: &RunStats) {
        self.requests_total = self.requests_total.saturating_add(other.requests_total);
        self.requests_failed = self.requests_failed.saturating_add(other.requests_failed);
        self.assertions_total = self.assertions_total.saturating_add(other.assertions_total);
        self.assertions_failed = self
            .assertions_failed
            .saturating_add(other.assertions_failed);
    }
}

/// A single failed assertion reported by the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    /// Request or item the assertion belongs to
    pub source: String,
    /// Assertion name
    pub test: String,
    pub message: String,
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} > {}: {}", self.source, self.test, self.message)
    }
}

/// What the engine hands back for a completed run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: RunStats,
    pub failures: Vec<FailureDetail>,
}

impl RunSummary {
    pub fn new(stats: RunStats) -> Self {
        Self {
            stats,
            failures: Vec::new(),
        }
    }

    pub fn with_failures(mut self, failures: Vec<FailureDetail>) -> Self {
        self.failures = failures;
        self
    }
}

/// Settled result of running one job
#[derive(Debug)]
pub enum JobOutcome {
    /// The engine completed; failure counts may still be non-zero
    Success {
        name: String,
        stats: RunStats,
        failures: Vec<FailureDetail>,
        duration_ms: u64,
    },
    /// The engine itself could not complete the job
    Failure {
        name: String,
        error: EngineError,
        duration_ms: u64,
    },
}

impl JobOutcome {
    pub fn success(name: impl Into<String>, summary: RunSummary, duration_ms: u64) -> Self {
        JobOutcome::Success {
            name: name.into(),
            stats: summary.stats,
            failures: summary.failures,
            duration_ms,
        }
    }

    pub fn failure(name: impl Into<String>, error: EngineError, duration_ms: u64) -> Self {
        JobOutcome::Failure {
            name: name.into(),
            error,
            duration_ms,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            JobOutcome::Success { name, .. } | JobOutcome::Failure { name, .. } => name,
        }
    }

    pub fn stats(&self) -> Option<&RunStats> {
        match self {
            JobOutcome::Success { stats, .. } => Some(stats),
            JobOutcome::Failure { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failure { .. })
    }

    /// Completed with zero failed requests and assertions
    pub fn is_passed(&self) -> bool {
        matches!(self, JobOutcome::Success { stats, .. } if !stats.has_failures())
    }

    pub fn symbol(&self) -> &'static str {
        if self.is_passed() {
            "✓"
        } else {
            "✗"
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Success {
                name,
                stats,
                duration_ms,
                ..
            } => write!(
                f,
                "{} {} - requests {}/{} failed, assertions {}/{} failed [{}ms]",
                self.symbol(),
                name,
                stats.requests_failed,
                stats.requests_total,
                stats.assertions_failed,
                stats.assertions_total,
                duration_ms
            ),
            JobOutcome::Failure { name, error, .. } => {
                write!(f, "{} {} - engine error: {}", self.symbol(), name, error)
            }
        }
    }
}
