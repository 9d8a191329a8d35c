#![forbid(unsafe_code)]

//! Frames: time-indexed partitions of a recorded terminal session.
//!
//! # Role in castplay
//! `castplay-frames` answers "what is on screen at time T" for a cast. It
//! splits the event log into fixed-size [`CastFrame`]s, each of which can
//! render its own events up to a time and reconstruct the cumulative
//! terminal output through its end. Cumulative snapshots are memoized per
//! frame, and [`CastFrameQueue::frame`] finds the frame covering a time by
//! binary search.
//!
//! # Primary responsibilities
//! - **Cast**: the event source (in-memory, or asciicast v2 with the
//!   `asciicast` feature).
//! - **CastFrame**: bounded slice of events plus a memoized snapshot.
//! - **CastFrameQueue**: ordered frames and time lookup.
//!
//! The playback clock lives in `castplay-clock`; the two crates never
//! reference each other.

#[cfg(feature = "asciicast")]
pub mod asciicast;
pub mod cast;
pub mod error;
pub mod frame;
pub mod queue;

#[cfg(feature = "asciicast")]
pub use asciicast::CastError;
pub use cast::{Cast, CastEvent, CastHeader};
pub use error::{FrameError, Result};
pub use frame::{CastFrame, SnapshotFn, identity_snapshot_fn};
pub use queue::{
    CastFrameQueue, DEFAULT_FINAL_FRAME_EPSILON, DEFAULT_FRAME_EVENTS_STEP, FrameQueueOptions,
};
