//! Data models for collection runs
//!
//! This module contains the job, option and outcome types shared by the
//! executor, engine and output layers.

mod job;
mod outcome;

pub use job::{CollectionSource, JobSpec, RunOptions, DEFAULT_DELAY_MS};
pub use outcome::{FailureDetail, JobOutcome, RunStats, RunSummary};
