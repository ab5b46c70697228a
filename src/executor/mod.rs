//! Job execution engine
//!
//! Provides sequential and parallel execution strategies over a shared
//! job runner. The two strategies deliberately differ on failure: sequential
//! stops at the first engine failure, parallel waits for every job.

#[cfg(test)]
mod fake;
mod parallel;
mod runner;
mod sequential;

pub use parallel::ParallelExecutor;
pub use runner::JobRunner;
pub use sequential::SequentialExecutor;

use async_trait::async_trait;

use crate::models::{JobOutcome, JobSpec, RunOptions};

/// A policy for running a list of jobs
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Run the jobs and return their outcomes in configuration order
    async fn run_all(
        &self,
        runner: &JobRunner,
        jobs: &[JobSpec],
        options: &RunOptions,
    ) -> Vec<JobOutcome>;
}

/// Pick the strategy selected by the run options
pub fn strategy_for(options: &RunOptions) -> Box<dyn ExecutionStrategy> {
    if options.parallel {
        Box::new(ParallelExecutor)
    } else {
        Box::new(SequentialExecutor)
    }
}
