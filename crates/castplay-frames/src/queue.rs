#![forbid(unsafe_code)]

//! Frame queue: partitions a cast into fixed-size frames and finds the
//! frame covering a playback time.
//!
//! # Usage
//!
//! ```
//! use castplay_frames::{CastEvent, CastFrameQueue};
//!
//! let events = vec![
//!     CastEvent::new(0.0, "$ "),
//!     CastEvent::new(0.5, "ls\r\n"),
//!     CastEvent::new(1.0, "a.txt\r\n"),
//! ];
//! let queue = CastFrameQueue::with_step(&events, 2).unwrap();
//! assert_eq!(queue.len(), 2);
//! assert_eq!(&*queue.frame(0.7).unwrap().snapshot(), "$ ls\r\n");
//! ```
//!
//! # Invariants
//!
//! 1. Frames are sorted and non-overlapping; frame `i` ends where frame
//!    `i + 1` starts.
//! 2. Each frame's `prev` is the frame constructed before it.
//! 3. The set of frames never changes after construction.
//!
//! # Failure Modes
//!
//! - Negative or NaN lookup time: [`FrameError::InvalidTime`].
//! - Lookup on an empty queue: [`FrameError::EmptyQueue`].
//! - Time past the end of the recording: clamps to the last frame.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::cast::CastEvent;
use crate::error::{FrameError, Result};
use crate::frame::{CastFrame, SnapshotFn, identity_snapshot_fn};

/// Events per frame when no step is given.
pub const DEFAULT_FRAME_EVENTS_STEP: usize = 30;

/// Width of the final frame when no later event bounds it.
pub const DEFAULT_FINAL_FRAME_EPSILON: f64 = 0.1;

/// Tunables for [`CastFrameQueue::with_options`].
#[derive(Clone)]
pub struct FrameQueueOptions {
    /// Maximum number of events per frame.
    pub events_step: usize,
    /// `end_time - start_time` of the last frame.
    pub final_frame_epsilon: f64,
    /// Transform applied to every linked frame's snapshot.
    pub snapshot_fn: SnapshotFn,
}

impl std::fmt::Debug for FrameQueueOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueueOptions")
            .field("events_step", &self.events_step)
            .field("final_frame_epsilon", &self.final_frame_epsilon)
            .finish_non_exhaustive()
    }
}

impl Default for FrameQueueOptions {
    fn default() -> Self {
        Self {
            events_step: DEFAULT_FRAME_EVENTS_STEP,
            final_frame_epsilon: DEFAULT_FINAL_FRAME_EPSILON,
            snapshot_fn: identity_snapshot_fn(),
        }
    }
}

impl FrameQueueOptions {
    /// Set the events per frame (builder pattern).
    #[must_use]
    pub fn events_step(mut self, step: usize) -> Self {
        self.events_step = step;
        self
    }

    /// Set the final frame width (builder pattern).
    #[must_use]
    pub fn final_frame_epsilon(mut self, epsilon: f64) -> Self {
        self.final_frame_epsilon = epsilon;
        self
    }

    /// Set the snapshot transform (builder pattern).
    #[must_use]
    pub fn snapshot_fn(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
        self.snapshot_fn = Rc::new(f);
        self
    }
}

/// Ordered frames over one cast's event log.
#[derive(Debug)]
pub struct CastFrameQueue<'a> {
    frames: Vec<Rc<CastFrame<'a>>>,
}

impl<'a> CastFrameQueue<'a> {
    /// Partition `events` into frames of [`DEFAULT_FRAME_EVENTS_STEP`] events.
    pub fn new(events: &'a [CastEvent]) -> Result<Self> {
        Self::with_options(events, FrameQueueOptions::default())
    }

    /// Partition `events` into frames of up to `step` events.
    pub fn with_step(events: &'a [CastEvent], step: usize) -> Result<Self> {
        Self::with_options(events, FrameQueueOptions::default().events_step(step))
    }

    /// Partition `events` with explicit options.
    ///
    /// Fails with [`FrameError::InvalidFrame`] when a frame would start and
    /// end at the same time, which happens when more than `events_step`
    /// consecutive events share a timestamp across a frame boundary.
    pub fn with_options(events: &'a [CastEvent], options: FrameQueueOptions) -> Result<Self> {
        let step = options.events_step;
        if step == 0 {
            return Err(FrameError::InvalidFrame {
                reason: "frame events step must be positive",
            });
        }

        let mut frames: Vec<Rc<CastFrame<'a>>> = Vec::with_capacity(events.len().div_ceil(step));
        for (index, chunk) in events.chunks(step).enumerate() {
            let start = index * step;
            let end = start + step;
            let start_time = chunk[0].time;
            let end_time = match events.get(end) {
                Some(next) => next.time,
                None => start_time + options.final_frame_epsilon,
            };
            let frame = Rc::new(CastFrame::new(
                start_time,
                end_time,
                chunk,
                Rc::clone(&options.snapshot_fn),
            )?);
            frame.link(frames.last());
            frames.push(frame);
        }

        debug!(
            events = events.len(),
            frames = frames.len(),
            step = step,
            "Frame queue built"
        );
        Ok(Self { frames })
    }

    /// Number of frames.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the queue has no frames.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Rc<CastFrame<'a>>> {
        self.frames.get(index)
    }

    /// Iterate frames oldest first.
    pub fn frames(&self) -> impl ExactSizeIterator<Item = &Rc<CastFrame<'a>>> {
        self.frames.iter()
    }

    /// The last frame, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Rc<CastFrame<'a>>> {
        self.frames.last()
    }

    /// The frame whose `[start_time, end_time)` covers `time`.
    ///
    /// Binary search over the ordered frames. A time beyond the end of the
    /// recording returns the last frame: playback past the end shows the
    /// final state.
    pub fn frame(&self, time: f64) -> Result<&Rc<CastFrame<'a>>> {
        if !(time >= 0.0) {
            return Err(FrameError::InvalidTime(time));
        }
        let Some(last) = self.frames.last() else {
            return Err(FrameError::EmptyQueue);
        };

        let mut lo = 0usize;
        let mut hi = self.frames.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let frame = &self.frames[mid];
            if time >= frame.end_time() {
                lo = mid + 1;
            } else if time < frame.start_time() {
                hi = mid;
            } else {
                trace!(time = time, index = mid, "Frame lookup");
                return Ok(frame);
            }
        }
        trace!(time = time, index = self.frames.len() - 1, "Frame lookup clamped");
        Ok(last)
    }
}
