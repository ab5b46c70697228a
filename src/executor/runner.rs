//! Job runner
//!
//! Wraps one engine invocation per job and turns its completion into a
//! settled [`JobOutcome`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::engine::{Engine, EngineConfig, EngineError};
use crate::models::{JobOutcome, JobSpec, RunOptions};
use crate::utils::Timer;

/// Runs single jobs against an engine
pub struct JobRunner {
    engine: Arc<dyn Engine>,
    reports_dir: PathBuf,
}

impl JobRunner {
    /// Create a new job runner
    pub fn new(engine: Arc<dyn Engine>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Run a single job.
    ///
    /// The engine call runs in its own task, so a panicking engine still
    /// settles the job exactly once, as a failure.
    pub async fn run_job(&self, job: &JobSpec, options: &RunOptions) -> JobOutcome {
        let config = EngineConfig::for_job(job, options, &self.reports_dir);
        let engine = Arc::clone(&self.engine);

        info!("Running {}", job);
        let timer = Timer::start(&job.name);

        let settled = match tokio::spawn(async move { engine.run(&config).await }).await {
            Ok(result) => result,
            Err(e) => Err(EngineError::Abandoned(describe_join_error(e))),
        };
        let duration_ms = timer.stop();

        match settled {
            Ok(summary) => {
                let outcome = JobOutcome::success(&job.name, summary, duration_ms);
                info!("  {}", outcome);
                outcome
            }
            Err(e) => {
                error!("Collection run failed for {}: {}", job.name, e);
                JobOutcome::failure(&job.name, e, duration_ms)
            }
        }
    }
}

fn describe_join_error(err: JoinError) -> String {
    if !err.is_panic() {
        return "engine task was cancelled".to_string();
    }

    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("engine panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("engine panicked: {msg}")
    } else {
        "engine panicked".to_string()
    }
}
