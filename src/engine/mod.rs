//! External collection engine
//!
//! The engine executes one collection pass and reports request and assertion
//! statistics. `NewmanCli` drives the newman command line; tests substitute
//! their own implementations of [`Engine`].

mod newman;

pub use newman::NewmanCli;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{CollectionSource, JobSpec, RunOptions, RunSummary};

/// Directory under the reports dir holding run summaries
pub const SUMMARY_DIR: &str = ".collection-runner";

/// Where the JSON summary for an HTML report is written.
///
/// Summaries live in their own directory so they never share a name with a
/// report, a collection or a dataset sitting in the reports dir.
pub fn summary_path_for(html_export: &Path) -> PathBuf {
    let parent = html_export.parent().unwrap_or_else(|| Path::new(""));
    let stem = html_export
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    parent.join(SUMMARY_DIR).join(format!("{stem}.summary.json"))
}

/// Errors raised when the engine cannot complete a run
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine exited with {status} without writing a summary{}", stderr_suffix(.stderr))]
    MissingSummary { status: String, stderr: String },

    #[error("malformed run summary {}: {reason}", .path.display())]
    MalformedSummary { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine task ended before settling: {0}")]
    Abandoned(String),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Report sinks requested from the engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reporter {
    /// Inline console output
    Cli,
    /// Standalone HTML report
    HtmlExtra { export: PathBuf, title: String },
}

/// Everything the engine needs for one collection pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub collection: CollectionSource,
    pub reporters: Vec<Reporter>,
    pub delay_request_ms: u64,
    pub iteration_data: Option<PathBuf>,
    pub folder: Option<String>,
}

impl EngineConfig {
    /// Build the engine configuration for a job.
    ///
    /// Iteration data and folder stay `None` unless the job sets them, so the
    /// engine never sees an empty value for either.
    pub fn for_job(job: &JobSpec, options: &RunOptions, reports_dir: &Path) -> Self {
        Self {
            collection: job.collection.clone(),
            reporters: vec![
                Reporter::Cli,
                Reporter::HtmlExtra {
                    export: reports_dir.join(&job.report_file),
                    title: job.name.clone(),
                },
            ],
            delay_request_ms: options.delay_ms,
            iteration_data: job
                .iteration_data
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            folder: job.folder.clone().filter(|f| !f.is_empty()),
        }
    }

    /// Export path of the HTML report, if one was requested
    pub fn html_export(&self) -> Option<&Path> {
        self.reporters.iter().find_map(|r| match r {
            Reporter::HtmlExtra { export, .. } => Some(export.as_path()),
            Reporter::Cli => None,
        })
    }
}

/// A collection execution engine
#[async_trait]
pub trait Engine: Send + Sync {
    /// Run one full pass over the configured collection
    async fn run(&self, config: &EngineConfig) -> Result<RunSummary, EngineError>;
}
