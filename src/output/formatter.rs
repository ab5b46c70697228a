//! Console formatting for run results
//!
//! Renders the startup banner, one block per job and the totals block.

use chrono::{DateTime, Local};

use super::summary::AggregateTotals;
use crate::models::{JobOutcome, RunOptions};

/// Failing assertions listed per job
const MAX_LISTED_FAILURES: usize = 5;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Rendered report plus the process exit status
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub totals: AggregateTotals,
    pub text: String,
    pub exit_code: u8,
}

/// Result formatter
pub struct ResultFormatter {
    colorize: bool,
}

impl ResultFormatter {
    pub fn new() -> Self {
        Self { colorize: true }
    }

    #[cfg(test)]
    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn with_color(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Startup banner stating mode and delay
    pub fn format_banner(
        &self,
        options: &RunOptions,
        job_count: usize,
        started: DateTime<Local>,
    ) -> String {
        format!(
            "\n{RULE}\n Running {} collection(s) in {} mode (delay {}ms)\n Started {}\n{RULE}\n",
            job_count,
            options.mode(),
            options.delay_ms,
            started.format("%Y-%m-%d %H:%M:%S")
        )
    }

    /// Aggregate the outcomes and render the full report
    pub fn summarize(&self, outcomes: &[JobOutcome]) -> RunReport {
        let totals = AggregateTotals::from_outcomes(outcomes);

        let mut text = String::new();
        text.push_str("\nJob Results\n");
        text.push_str(RULE);
        text.push('\n');
        for outcome in outcomes {
            text.push_str(&self.format_outcome(outcome));
        }
        text.push_str(RULE);
        text.push('\n');
        text.push_str(&self.format_totals(&totals));

        RunReport {
            totals,
            text,
            exit_code: totals.exit_code(),
        }
    }

    /// Format one job's block
    pub fn format_outcome(&self, outcome: &JobOutcome) -> String {
        match outcome {
            JobOutcome::Success {
                name,
                stats,
                failures,
                duration_ms,
            } => {
                let marker = if outcome.is_passed() {
                    self.paint("✓ PASS ", "32")
                } else {
                    self.paint("✗ FAIL ", "31")
                };

                let mut block = format!(
                    "  {marker} {name}\n          requests: {} (failed {}) | assertions: {} (failed {}) | {}ms\n",
                    stats.requests_total,
                    stats.requests_failed,
                    stats.assertions_total,
                    stats.assertions_failed,
                    duration_ms
                );

                for failure in failures.iter().take(MAX_LISTED_FAILURES) {
                    block.push_str(&format!("          - {failure}\n"));
                }
                if failures.len() > MAX_LISTED_FAILURES {
                    block.push_str(&format!(
                        "          ... and {} more\n",
                        failures.len() - MAX_LISTED_FAILURES
                    ));
                }

                block
            }
            JobOutcome::Failure { name, error, .. } => format!(
                "  {} {name}\n          engine error: {error}\n",
                self.paint("! ERROR", "31")
            ),
        }
    }

    /// Format the totals block
    pub fn format_totals(&self, totals: &AggregateTotals) -> String {
        let verdict = if totals.is_success() {
            self.paint("PASSED", "32")
        } else {
            self.paint("FAILED", "31")
        };

        let mut output = String::new();
        output.push_str("\n========== Test Summary ==========\n");
        output.push_str(&format!("Total requests: {}\n", totals.stats.requests_total));
        output.push_str(&format!("Failed requests: {}\n", totals.stats.requests_failed));
        output.push_str(&format!(
            "Total assertions: {}\n",
            totals.stats.assertions_total
        ));
        output.push_str(&format!(
            "Failed assertions: {}\n",
            totals.stats.assertions_failed
        ));
        output.push_str(&format!(
            "Jobs passed: {}/{}",
            totals.passed, totals.jobs
        ));
        if totals.engine_failures > 0 {
            output.push_str(&format!(
                " | Engine errors: {}",
                totals.engine_failures
            ));
        }
        output.push('\n');
        output.push_str(&format!("Result: {verdict}\n"));

        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new()
    }
}
