//! Session and solve errors

use crate::source::SourceId;
use thiserror::Error;

/// Why a solve request did not produce a snapshot.
///
/// None of these are fatal: the session keeps its registry and previous snapshot.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid bounds on {axis} axis: min {min} must be finite and below max {max}")]
    InvalidBounds { axis: char, min: f64, max: f64 },

    #[error("resolution must be between 1 and {max}, got {resolution}")]
    InvalidResolution { resolution: usize, max: usize },

    #[error("solve ticket does not belong to the pending solve")]
    StaleTicket,

    #[error("field solve failed: {0}")]
    Solver(anyhow::Error),
}

/// Errors from registry edits.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown source: {0}")]
    UnknownSource(SourceId),

    #[error("unknown source type: {0}")]
    UnknownKind(String),
}
