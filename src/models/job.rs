//! Job models
//!
//! Defines the configured collection runs and the options they execute with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default delay between requests, in milliseconds
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Reference to a collection, passed to the engine untouched.
///
/// Either a local file path or a URL; the runner never reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionSource(String);

impl CollectionSource {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_remote(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }
}

impl fmt::Display for CollectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One configured collection run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Display name, also used as the HTML report title
    pub name: String,

    /// Collection to execute
    pub collection: CollectionSource,

    /// Optional iteration dataset (CSV or JSON)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_data: Option<PathBuf>,

    /// Optional folder to restrict the run to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,

    /// HTML report file name, relative to the reports directory
    pub report_file: String,
}

impl JobSpec {
    pub fn new(
        name: impl Into<String>,
        collection: impl Into<String>,
        report_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            collection: CollectionSource::new(collection),
            iteration_data: None,
            folder: None,
            report_file: report_file.into(),
        }
    }

    pub fn with_iteration_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.iteration_data = Some(path.into());
        self
    }

    #[cfg(test)]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }
}

impl fmt::Display for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.collection)?;
        if let Some(folder) = &self.folder {
            write!(f, " [folder: {folder}]")?;
        }
        Ok(())
    }
}

/// Options derived once from the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub parallel: bool,
    pub delay_ms: u64,
}

impl RunOptions {
    pub fn mode(&self) -> &'static str {
        if self.parallel {
            "parallel"
        } else {
            "sequential"
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            delay_ms: DEFAULT_DELAY_MS,
        }
    }
}
