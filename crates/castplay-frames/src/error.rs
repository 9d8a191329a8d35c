#![forbid(unsafe_code)]

//! Error types for frame construction and lookup.

use thiserror::Error;

/// Failures raised by [`CastFrame`](crate::CastFrame) and
/// [`CastFrameQueue`](crate::CastFrameQueue).
///
/// None of these are transient: each one points at a malformed log or a
/// caller selecting the wrong frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    /// Frame construction parameters violate the frame invariants.
    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: &'static str },

    /// A `data()` query fell outside the frame's `[start, end)` window.
    #[error("cannot get data of time {time} from frame [{start}, {end})")]
    OutOfRange { time: f64, start: f64, end: f64 },

    /// Frame lookup with a negative (or NaN) time.
    #[error("time must be non-negative, got {0}")]
    InvalidTime(f64),

    /// Frame lookup on a queue without frames.
    #[error("frame queue is empty")]
    EmptyQueue,
}

/// Result alias for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;
