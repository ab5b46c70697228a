//! Parallel job execution
//!
//! All jobs are submitted at once and multiplexed on the current runtime.
//! The run waits for every job to settle, even when some fail.

use async_trait::async_trait;
use futures::future::join_all;
use std::time::Instant;
use tracing::{info, warn};

use super::{ExecutionStrategy, JobRunner};
use crate::models::{JobOutcome, JobSpec, RunOptions};

/// Runs all jobs concurrently
#[derive(Clone, Copy, Debug, Default)]
pub struct ParallelExecutor;

#[async_trait]
impl ExecutionStrategy for ParallelExecutor {
    fn name(&self) -> &'static str {
        "parallel"
    }

    async fn run_all(
        &self,
        runner: &JobRunner,
        jobs: &[JobSpec],
        options: &RunOptions,
    ) -> Vec<JobOutcome> {
        info!("Submitting {} jobs concurrently", jobs.len());

        let start = Instant::now();
        // join_all keeps configuration order regardless of completion order
        let outcomes = join_all(jobs.iter().map(|job| runner.run_job(job, options))).await;

        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        if failed > 0 {
            warn!("{} of {} jobs failed to complete", failed, outcomes.len());
        }
        info!(
            "Parallel execution completed in {}ms",
            start.elapsed().as_millis()
        );

        outcomes
    }
}
