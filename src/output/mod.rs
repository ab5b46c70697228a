//! Output module
//!
//! Aggregates job outcomes and formats them for the console.

mod formatter;
mod summary;

pub use formatter::{ResultFormatter, RunReport};
