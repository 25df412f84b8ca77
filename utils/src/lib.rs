//! Shared utilities for the Ballot workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
