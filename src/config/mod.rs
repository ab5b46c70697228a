//! Configuration module
//!
//! Resolves the run configuration from a config file, environment
//! overrides and built-in defaults.

mod env;
mod file;

pub use env::EnvConfig;
pub use file::RunConfig;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolve the configuration for this run.
///
/// An explicit config path from the environment must exist; otherwise the
/// standard locations are searched and the built-in jobs used as fallback.
pub fn resolve(env: &EnvConfig) -> Result<RunConfig> {
    let mut config = match &env.config_file {
        Some(path) => {
            info!("Loading configuration from {}", path);
            RunConfig::load(path)?
        }
        None => match RunConfig::find() {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                RunConfig::load(&path)?
            }
            None => {
                debug!("No configuration file found, using built-in jobs");
                RunConfig::default()
            }
        },
    };

    if let Some(dir) = &env.reports_dir {
        config.reports_dir = PathBuf::from(dir);
    }
    if let Some(newman) = &env.newman {
        config.newman = newman.clone();
    }

    config.validate()?;

    for job in &config.jobs {
        if !job.collection.is_remote() && !Path::new(job.collection.as_str()).exists() {
            warn!("Collection for '{}' not found: {}", job.name, job.collection);
        }
    }

    Ok(config)
}
