//! Shared utilities

pub mod logger;
pub mod timer;

pub use logger::init_logger;
pub use timer::Timer;
