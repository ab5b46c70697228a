//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::str::FromStr;
use tracing::Level;

/// Environment variable prefix
const ENV_PREFIX: &str = "COLLECTION_RUNNER";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Config file from COLLECTION_RUNNER_CONFIG
    pub config_file: Option<String>,
    /// Reports directory from COLLECTION_RUNNER_REPORTS_DIR
    pub reports_dir: Option<String>,
    /// newman command from COLLECTION_RUNNER_NEWMAN
    pub newman: Option<Vec<String>>,
    /// Log level from COLLECTION_RUNNER_LOG
    pub log_level: Option<String>,
    /// Colors from COLLECTION_RUNNER_COLOR
    pub color: Option<bool>,
    /// Set when NO_COLOR is present
    pub no_color: bool,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            config_file: get_env("CONFIG"),
            reports_dir: get_env("REPORTS_DIR"),
            newman: get_env("NEWMAN").map(|v| split_command(&v)).filter(|c| !c.is_empty()),
            log_level: get_env("LOG"),
            color: get_env_bool("COLOR"),
            no_color: env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
        }
    }

    /// Log level from COLLECTION_RUNNER_LOG, `info` when unset or unknown
    pub fn log_level(&self) -> Level {
        self.log_level
            .as_deref()
            .and_then(parse_level)
            .unwrap_or(Level::INFO)
    }

    /// Whether console output should be colored.
    ///
    /// An explicit COLLECTION_RUNNER_COLOR wins over NO_COLOR.
    pub fn colorize(&self, is_terminal: bool) -> bool {
        match self.color {
            Some(color) => color,
            None => is_terminal && !self.no_color,
        }
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

fn parse_level(name: &str) -> Option<Level> {
    match name.trim().to_ascii_lowercase().as_str() {
        "warning" => Some(Level::WARN),
        other => Level::from_str(other).ok(),
    }
}

fn split_command(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}
