//! Configuration file management
//!
//! Handles finding, loading, and validating the job configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::engine::summary_path_for;
use crate::models::JobSpec;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./collection-runner.yaml",
    "./collection-runner.yml",
    "./.collection-runner.yaml",
];

fn default_reports_dir() -> PathBuf {
    PathBuf::from("./reports")
}

fn default_newman() -> Vec<String> {
    vec!["newman".to_string()]
}

/// The collections shipped with the Books API test suite
fn default_jobs() -> Vec<JobSpec> {
    vec![
        JobSpec::new(
            "Books API - CRUD Regression Tests",
            "Books API - CRUD Regression Tests.postman_collection.json",
            "books-crud-report.html",
        ),
        JobSpec::new(
            "Books API - Data-Driven Tests",
            "Books API - Data-Driven Tests.postman_collection.json",
            "books-data-driven-report.html",
        )
        .with_iteration_data("data/books.csv"),
    ]
}

/// Full run configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory receiving HTML reports and JSON summaries
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// newman program and leading arguments
    #[serde(default = "default_newman")]
    pub newman: Vec<String>,

    /// Jobs to run, in order
    #[serde(default = "default_jobs")]
    pub jobs: Vec<JobSpec>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            reports_dir: default_reports_dir(),
            newman: default_newman(),
            jobs: default_jobs(),
        }
    }
}

impl RunConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.newman.iter().all(|part| part.trim().is_empty()) {
            anyhow::bail!("newman command must not be empty");
        }
        if self.jobs.is_empty() {
            anyhow::bail!("No jobs configured");
        }

        let mut reports = HashSet::new();
        let mut outputs = HashSet::new();

        for job in &self.jobs {
            if job.name.trim().is_empty() {
                anyhow::bail!("Job for collection '{}' has no name", job.collection);
            }
            if job.report_file.trim().is_empty() {
                anyhow::bail!("Job '{}' has no report file", job.name);
            }
            if !reports.insert(job.report_file.as_str()) {
                anyhow::bail!(
                    "Report file '{}' is used by more than one job",
                    job.report_file
                );
            }

            let html = self.reports_dir.join(&job.report_file);
            let summary = summary_path_for(&html);
            for path in [&html, &summary] {
                if !outputs.insert(normalize(path)) {
                    anyhow::bail!(
                        "Report file '{}' in job '{}' collides with another job's output {}",
                        job.report_file,
                        job.name,
                        path.display()
                    );
                }
            }
        }

        // Collections and datasets are inputs and must never be written
        for job in &self.jobs {
            let collection = (!job.collection.is_remote())
                .then(|| PathBuf::from(job.collection.as_str()));
            for input in collection.iter().chain(job.iteration_data.iter()) {
                if outputs.contains(&normalize(input)) {
                    anyhow::bail!(
                        "Input '{}' of job '{}' would be overwritten by a report",
                        input.display(),
                        job.name
                    );
                }
            }
        }

        Ok(())
    }
}

/// Absolute form of a path with `.` components dropped, for comparisons
fn normalize(path: &Path) -> PathBuf {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
