//! newman command-line engine
//!
//! Runs a collection through the `newman` CLI and reads the run statistics
//! back from its JSON reporter.

use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::process::Command;
use tracing::{debug, warn};

use super::{summary_path_for, Engine, EngineConfig, EngineError, Reporter};
use crate::models::{FailureDetail, RunStats, RunSummary};

/// Lines of stderr kept for error messages
const STDERR_TAIL_LINES: usize = 20;

static SUMMARY_SEQ: AtomicU64 = AtomicU64::new(0);

/// Engine backed by the newman CLI
#[derive(Clone, Debug)]
pub struct NewmanCli {
    /// Program and leading arguments, e.g. `["npx", "newman"]`
    command: Vec<String>,
    quiet: bool,
}

impl NewmanCli {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            quiet: false,
        }
    }

    /// Discard the engine's console output
    #[allow(dead_code)]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Where the JSON reporter writes the run summary
    pub fn summary_path(config: &EngineConfig) -> PathBuf {
        match config.html_export() {
            Some(export) => summary_path_for(export),
            None => std::env::temp_dir().join(format!(
                "collection-runner-{}-{}.json",
                std::process::id(),
                SUMMARY_SEQ.fetch_add(1, Ordering::Relaxed)
            )),
        }
    }
}

impl Default for NewmanCli {
    fn default() -> Self {
        Self::new(vec!["newman".to_string()])
    }
}

#[async_trait]
impl Engine for NewmanCli {
    async fn run(&self, config: &EngineConfig) -> Result<RunSummary, EngineError> {
        let (program, prefix) = self.command.split_first().ok_or_else(|| {
            EngineError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                "empty newman command",
            ))
        })?;

        let summary_path = Self::summary_path(config);
        remove_stale(&summary_path).await?;
        if let Some(parent) = summary_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = command_args(config, &summary_path);
        debug!("Spawning {} {:?} {:?}", program, prefix, args);

        let stdout = if self.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        };

        let child = Command::new(program)
            .args(prefix)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: program.clone(),
                source,
            })?;
        let output = child.wait_with_output().await?;

        let stderr = stderr_tail(&output.stderr);
        if !stderr.is_empty() {
            debug!("{} stderr:\n{}", program, stderr);
        }

        // newman exits non-zero on failed assertions, so only the summary
        // tells a finished run apart from a broken one
        match tokio::fs::read(&summary_path).await {
            Ok(bytes) => {
                if !output.status.success() {
                    debug!("{} exited with {}", program, output.status);
                }
                parse_summary(&bytes, &summary_path)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{} exited with {} and no summary", program, output.status);
                Err(EngineError::MissingSummary {
                    status: output.status.to_string(),
                    stderr,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Build the `newman run` argument list.
///
/// Unset iteration data and folder produce no flags at all.
pub fn command_args(config: &EngineConfig, summary_path: &Path) -> Vec<OsString> {
    let mut reporters: Vec<&str> = Vec::new();
    let mut reporter_args: Vec<OsString> = Vec::new();

    for reporter in &config.reporters {
        match reporter {
            Reporter::Cli => reporters.push("cli"),
            Reporter::HtmlExtra { export, title } => {
                reporters.push("htmlextra");
                reporter_args.push("--reporter-htmlextra-export".into());
                reporter_args.push(export.into());
                reporter_args.push("--reporter-htmlextra-title".into());
                reporter_args.push(title.into());
            }
        }
    }
    reporters.push("json");
    reporter_args.push("--reporter-json-export".into());
    reporter_args.push(summary_path.into());

    let mut args: Vec<OsString> = vec![
        "run".into(),
        config.collection.as_str().into(),
        "--reporters".into(),
        reporters.join(",").into(),
    ];
    args.extend(reporter_args);
    args.push("--delay-request".into());
    args.push(config.delay_request_ms.to_string().into());

    if let Some(data) = &config.iteration_data {
        args.push("--iteration-data".into());
        args.push(data.into());
    }
    if let Some(folder) = &config.folder {
        args.push("--folder".into());
        args.push(folder.into());
    }

    args
}

#[derive(Deserialize)]
struct NewmanReport {
    run: NewmanRun,
}

#[derive(Deserialize)]
struct NewmanRun {
    stats: NewmanStats,
    #[serde(default)]
    failures: Vec<NewmanFailure>,
}

#[derive(Deserialize)]
struct NewmanStats {
    #[serde(default)]
    requests: Counter,
    #[serde(default)]
    assertions: Counter,
}

#[derive(Default, Deserialize)]
struct Counter {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    failed: u64,
}

#[derive(Deserialize)]
struct NewmanFailure {
    #[serde(default)]
    source: Option<FailureSource>,
    #[serde(default)]
    error: Option<FailureError>,
}

#[derive(Deserialize)]
struct FailureSource {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct FailureError {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    test: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse a newman JSON reporter export
pub fn parse_summary(bytes: &[u8], path: &Path) -> Result<RunSummary, EngineError> {
    let report: NewmanReport =
        serde_json::from_slice(bytes).map_err(|e| EngineError::MalformedSummary {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let stats = report.run.stats;
    let stats = RunStats::new(
        stats.requests.total,
        stats.requests.failed,
        stats.assertions.total,
        stats.assertions.failed,
    );
    if !stats.is_consistent() {
        return Err(EngineError::MalformedSummary {
            path: path.to_path_buf(),
            reason: "failed count exceeds total".to_string(),
        });
    }

    let failures = report
        .run
        .failures
        .into_iter()
        .map(|failure| {
            let error = failure.error.unwrap_or(FailureError {
                name: None,
                test: None,
                message: None,
            });
            FailureDetail {
                source: failure
                    .source
                    .and_then(|s| s.name)
                    .unwrap_or_else(|| "<unknown>".to_string()),
                test: error.test.or(error.name).unwrap_or_default(),
                message: error.message.unwrap_or_default(),
            }
        })
        .collect();

    Ok(RunSummary::new(stats).with_failures(failures))
}

async fn remove_stale(path: &Path) -> Result<(), EngineError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed stale summary {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobSpec, RunOptions};

    const SAMPLE_SUMMARY: &str = r#"{
        "collection": {"info": {"name": "Books API - CRUD Regression Tests"}},
        "run": {
            "stats": {
                "iterations": {"total": 1, "pending": 0, "failed": 0},
                "requests": {"total": 12, "pending": 0, "failed": 1},
                "assertions": {"total": 30, "pending": 0, "failed": 2}
            },
            "timings": {"responseAverage": 41.5, "started": 1700000000000, "completed": 1700000001200},
            "failures": [
                {
                    "error": {"name": "AssertionError", "test": "Status code is 201", "message": "expected 500 to equal 201"},
                    "source": {"name": "Create book"}
                },
                {
                    "error": {"name": "Error", "message": "connect ECONNREFUSED 127.0.0.1:3000"},
                    "source": {"name": "Delete book"}
                }
            ]
        }
    }"#;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_command_args_without_optional_settings() {
        let job = JobSpec::new("Books CRUD", "books.json", "books.html");
        let config = EngineConfig::for_job(&job, &RunOptions::default(), Path::new("reports"));
        let args = strings(&command_args(&config, Path::new("reports/books.json")));

        assert_eq!(
            args,
            vec![
                "run",
                "books.json",
                "--reporters",
                "cli,htmlextra,json",
                "--reporter-htmlextra-export",
                "reports/books.html",
                "--reporter-htmlextra-title",
                "Books CRUD",
                "--reporter-json-export",
                "reports/books.json",
                "--delay-request",
                "500",
            ]
        );
    }

    #[test]
    fn test_command_args_with_optional_settings() {
        let job = JobSpec::new("Books", "books.json", "books.html")
            .with_iteration_data("data/books.csv")
            .with_folder("Create");
        let options = RunOptions {
            parallel: true,
            delay_ms: 0,
        };
        let config = EngineConfig::for_job(&job, &options, Path::new("reports"));
        let args = strings(&command_args(&config, Path::new("reports/books.json")));

        let tail: Vec<&str> = args[args.len() - 6..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "--delay-request",
                "0",
                "--iteration-data",
                "data/books.csv",
                "--folder",
                "Create"
            ]
        );
    }

    #[test]
    fn test_summary_path_follows_html_report() {
        let job = JobSpec::new("Books", "books.json", "books-report.html");
        let config = EngineConfig::for_job(&job, &RunOptions::default(), Path::new("reports"));
        assert_eq!(
            NewmanCli::summary_path(&config),
            PathBuf::from("reports/.collection-runner/books-report.summary.json")
        );
    }

    #[test]
    fn test_json_report_file_keeps_separate_summary() {
        let job = JobSpec::new("Books", "books.postman_collection.json", "books.json");
        let config = EngineConfig::for_job(&job, &RunOptions::default(), Path::new("reports"));
        assert_eq!(config.html_export(), Some(Path::new("reports/books.json")));
        assert_ne!(
            Some(NewmanCli::summary_path(&config).as_path()),
            config.html_export()
        );
    }

    #[test]
    fn test_parse_summary() {
        let summary = parse_summary(SAMPLE_SUMMARY.as_bytes(), Path::new("s.json")).unwrap();
        assert_eq!(summary.stats, RunStats::new(12, 1, 30, 2));
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(summary.failures[0].source, "Create book");
        assert_eq!(summary.failures[0].test, "Status code is 201");
        assert_eq!(summary.failures[1].test, "Error");
    }

    #[test]
    fn test_parse_summary_rejects_garbage() {
        let err = parse_summary(b"not json", Path::new("s.json")).unwrap_err();
        assert!(matches!(err, EngineError::MalformedSummary { .. }));
    }

    #[test]
    fn test_parse_summary_rejects_inconsistent_stats() {
        let body = r#"{"run": {"stats": {"requests": {"total": 1, "failed": 2}, "assertions": {"total": 0, "failed": 0}}}}"#;
        let err = parse_summary(body.as_bytes(), Path::new("s.json")).unwrap_err();
        assert!(err.to_string().contains("failed count exceeds total"));
    }

    #[test]
    fn test_stderr_tail() {
        let stderr: String = (1..=30).map(|i| format!("line {i}\n")).collect();
        let tail = stderr_tail(stderr.as_bytes());
        assert!(tail.starts_with("line 11"));
        assert!(tail.ends_with("line 30"));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let engine = NewmanCli::new(vec!["collection-runner-no-such-binary".into()]).quiet();
        let job = JobSpec::new("Books", "books.json", "books.html");
        let config = EngineConfig::for_job(&job, &RunOptions::default(), dir.path());

        let err = engine.run(&config).await.unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_reads_summary_despite_failing_exit() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-newman.sh");
        let body = SAMPLE_SUMMARY.replace('\n', " ");
        std::fs::write(
            &script,
            format!(
                "while [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--reporter-json-export\" ]; then out=\"$2\"; fi\n  shift\ndone\nprintf '%s' '{body}' > \"$out\"\nexit 1\n"
            ),
        )
        .unwrap();

        let engine =
            NewmanCli::new(vec!["sh".into(), script.to_string_lossy().into_owned()]).quiet();
        let job = JobSpec::new("Books", "books.json", "books.html");
        let config =
            EngineConfig::for_job(&job, &RunOptions::default(), &dir.path().join("reports"));

        let summary = engine.run(&config).await.unwrap();
        assert_eq!(summary.stats, RunStats::new(12, 1, 30, 2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_without_summary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("broken-newman.sh");
        std::fs::write(&script, "echo 'collection could not be loaded' >&2\nexit 1\n").unwrap();

        let reports = dir.path().join("reports");
        let stale = reports.join(".collection-runner").join("books.summary.json");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        // Left over from an earlier run; must not be mistaken for this one
        std::fs::write(&stale, SAMPLE_SUMMARY).unwrap();

        let engine =
            NewmanCli::new(vec!["sh".into(), script.to_string_lossy().into_owned()]).quiet();
        let job = JobSpec::new("Books", "books.json", "books.html");
        let config = EngineConfig::for_job(&job, &RunOptions::default(), &reports);

        match engine.run(&config).await {
            Err(EngineError::MissingSummary { stderr, .. }) => {
                assert_eq!(stderr, "collection could not be loaded");
            }
            other => panic!("expected MissingSummary, got {other:?}"),
        }
        assert!(!stale.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_collection_in_reports_dir_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("broken-newman.sh");
        std::fs::write(&script, "exit 1\n").unwrap();

        let collection = dir.path().join("books.json");
        std::fs::write(&collection, "{\"info\": {\"name\": \"Books\"}}").unwrap();

        let engine =
            NewmanCli::new(vec!["sh".into(), script.to_string_lossy().into_owned()]).quiet();
        let job = JobSpec::new("Books", collection.to_string_lossy(), "books.html");
        let config = EngineConfig::for_job(&job, &RunOptions::default(), dir.path());

        let err = engine.run(&config).await.unwrap_err();
        assert!(matches!(err, EngineError::MissingSummary { .. }));
        assert!(collection.exists());
    }
}
