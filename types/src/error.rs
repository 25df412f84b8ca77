//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised by the shared types themselves.
#[derive(Debug, Error)]
pub enum BallotError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}
