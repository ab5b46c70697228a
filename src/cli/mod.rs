//! CLI argument parsing
//!
//! The command line is `collection-runner [--parallel] [--delay=<ms>]`.
//! Anything else is ignored, and a missing or unparsable delay falls back to
//! the default rather than failing the run.

use crate::models::{RunOptions, DEFAULT_DELAY_MS};

const PARALLEL_FLAG: &str = "--parallel";
const DELAY_PREFIX: &str = "--delay=";

/// Parse run options from process arguments (program name excluded)
pub fn parse_args<I, S>(args: I) -> RunOptions
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<S> = args.into_iter().collect();
    let mut parallel = false;
    let mut delay: Option<&str> = None;

    for arg in &args {
        let arg = arg.as_ref();
        if arg == PARALLEL_FLAG {
            parallel = true;
        } else if delay.is_none() {
            delay = arg.strip_prefix(DELAY_PREFIX);
        }
    }

    RunOptions {
        parallel,
        delay_ms: delay
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_DELAY_MS),
    }
}

/// Parse run options from `std::env::args`
pub fn from_env() -> RunOptions {
    parse_args(std::env::args().skip(1))
}
