//! Sequential job execution
//!
//! Jobs run one at a time in configuration order. The first engine failure
//! ends the run; later jobs are never started.

use async_trait::async_trait;
use tracing::{info, warn};

use super::{ExecutionStrategy, JobRunner};
use crate::models::{JobOutcome, JobSpec, RunOptions};

/// Runs jobs strictly one after another
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialExecutor;

#[async_trait]
impl ExecutionStrategy for SequentialExecutor {
    fn name(&self) -> &'static str {
        "sequential"
    }

    async fn run_all(
        &self,
        runner: &JobRunner,
        jobs: &[JobSpec],
        options: &RunOptions,
    ) -> Vec<JobOutcome> {
        let mut outcomes = Vec::with_capacity(jobs.len());

        for (index, job) in jobs.iter().enumerate() {
            info!("=== Job {}/{} ===", index + 1, jobs.len());

            let outcome = runner.run_job(job, options).await;
            let failed = outcome.is_failure();
            outcomes.push(outcome);

            if failed {
                let skipped: Vec<&str> = jobs[index + 1..]
                    .iter()
                    .map(|j| j.name.as_str())
                    .collect();
                if !skipped.is_empty() {
                    warn!(
                        "Aborting after {} failed; not started: {}",
                        job.name,
                        skipped.join(", ")
                    );
                }
                break;
            }
        }

        outcomes
    }
}
