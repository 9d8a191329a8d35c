#![forbid(unsafe_code)]

//! Error types for clock configuration.

use thiserror::Error;

/// Rejected clock parameters. The clock keeps its previous settings.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ClockError {
    /// Timescale must be finite and strictly positive.
    #[error("timescale must be a positive number, got {0}")]
    InvalidTimescale(f64),

    /// Duration must be finite and strictly positive.
    #[error("duration must be a positive number, got {0}")]
    InvalidDuration(f64),
}
