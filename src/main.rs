//! Collection Runner - newman orchestration for Postman collections
//!
//! Runs every configured Postman collection through newman, either one after
//! another or all at once, then prints an aggregate summary. The process
//! exits non-zero when any request or assertion failed, or when newman could
//! not complete a collection at all.
//!
//! ## Usage
//!
//! ```bash
//! # Run collections one at a time with the default 500ms request delay
//! collection-runner
//!
//! # Run all collections concurrently without delay
//! collection-runner --parallel --delay=0
//! ```
//!
//! Jobs come from `collection-runner.yaml` (or `COLLECTION_RUNNER_CONFIG`);
//! without one the built-in Books API collections are used. HTML reports are
//! written to `./reports/<report_file>`.

use anyhow::{Context, Result};
use chrono::Local;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

mod cli;
mod config;
mod engine;
mod executor;
mod models;
mod output;
mod utils;

use config::EnvConfig;
use engine::NewmanCli;
use executor::{strategy_for, JobRunner};
use models::JobOutcome;
use output::ResultFormatter;
use utils::init_logger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env = EnvConfig::load();

    init_logger(env.log_level());

    match run(&env).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Collection run failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(env: &EnvConfig) -> Result<u8> {
    let options = cli::from_env();
    let config = config::resolve(env)?;

    tokio::fs::create_dir_all(&config.reports_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create reports directory: {}",
                config.reports_dir.display()
            )
        })?;

    let formatter =
        ResultFormatter::new().with_color(env.colorize(std::io::stdout().is_terminal()));
    println!(
        "{}",
        formatter.format_banner(&options, config.jobs.len(), Local::now())
    );

    let engine = Arc::new(NewmanCli::new(config.newman.clone()));
    let runner = JobRunner::new(engine, config.reports_dir.clone());
    let strategy = strategy_for(&options);

    info!(
        "Running {} jobs ({} mode, delay {}ms), reports in {}",
        config.jobs.len(),
        strategy.name(),
        options.delay_ms,
        runner.reports_dir().display()
    );

    let outcomes = strategy.run_all(&runner, &config.jobs, &options).await;

    for outcome in &outcomes {
        if let JobOutcome::Failure { name, error, .. } = outcome {
            eprintln!("Collection run failed for '{name}': {error}");
        }
    }

    let report = formatter.summarize(&outcomes);
    println!("{}", report.text);
    info!(
        "{}/{} jobs passed, exit code {}",
        report.totals.passed, report.totals.jobs, report.exit_code
    );

    Ok(report.exit_code)
}
