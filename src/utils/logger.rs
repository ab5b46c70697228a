//! Tracing subscriber setup

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Filter directive limiting output to this crate at `level`
fn crate_directive(level: Level) -> String {
    format!("collection_runner={level}")
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise only this crate logs, at `level`.
pub fn init_logger(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate_directive(level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
