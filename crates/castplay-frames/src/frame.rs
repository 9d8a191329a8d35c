#![forbid(unsafe_code)]

//! A single frame: a contiguous, time-bounded slice of the event log.
//!
//! Frames form a singly-linked chain from oldest to newest through a
//! non-owning `prev` link. The owning [`CastFrameQueue`](crate::CastFrameQueue)
//! keeps every frame alive; a frame only holds a [`Weak`] back-reference.
//!
//! # Invariants
//!
//! 1. `end_time > start_time >= 0`.
//! 2. The event slice is non-empty and its first event starts before
//!    `end_time`.
//! 3. `snapshot()` equals `transform(prev.snapshot() + own)` for linked
//!    frames and `own` for a frame without a predecessor.
//! 4. The memo is cleared only when `prev` is reassigned to a different
//!    frame (compared by identity).
//! 5. The `prev` chain is acyclic; `set_prev` refuses links that would
//!    close a loop.
//!
//! # Failure Modes
//!
//! - Malformed bounds or an empty slice: [`FrameError::InvalidFrame`].
//! - `data()` outside `[start_time, end_time)`: [`FrameError::OutOfRange`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::cast::CastEvent;
use crate::error::{FrameError, Result};

/// Post-processing applied to a concatenated snapshot before it is cached.
///
/// Lets a player compact accumulated output (for example by collapsing
/// control sequences) without replaying history on every lookup.
pub type SnapshotFn = Rc<dyn Fn(&str) -> String>;

/// The default transform: returns its input unchanged.
#[must_use]
pub fn identity_snapshot_fn() -> SnapshotFn {
    Rc::new(|s: &str| s.to_owned())
}

/// Memo cell for a frame's cumulative snapshot.
#[derive(Debug, Clone)]
enum Memo {
    Stale,
    Computed(Rc<str>),
}

/// A bounded run of cast events with a memoized cumulative snapshot.
pub struct CastFrame<'a> {
    start_time: f64,
    end_time: f64,
    events: &'a [CastEvent],
    prev: RefCell<Option<Weak<CastFrame<'a>>>>,
    memo: RefCell<Memo>,
    snapshot_fn: SnapshotFn,
}

impl fmt::Debug for CastFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastFrame")
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("event_count", &self.events.len())
            .field("has_prev", &self.prev().is_some())
            .field("memo", &*self.memo.borrow())
            .finish_non_exhaustive()
    }
}

impl<'a> CastFrame<'a> {
    /// Create a frame over `events` covering `[start_time, end_time)`.
    pub fn new(
        start_time: f64,
        end_time: f64,
        events: &'a [CastEvent],
        snapshot_fn: SnapshotFn,
    ) -> Result<Self> {
        let Some(first) = events.first() else {
            return Err(FrameError::InvalidFrame {
                reason: "empty events",
            });
        };
        // Negated comparisons so NaN bounds are rejected too.
        if !(start_time >= 0.0) || !(end_time > start_time) {
            return Err(FrameError::InvalidFrame {
                reason: "incorrect time or size",
            });
        }
        if !(first.time < end_time) {
            return Err(FrameError::InvalidFrame {
                reason: "first event is not before the frame end",
            });
        }
        Ok(Self {
            start_time,
            end_time,
            events,
            prev: RefCell::new(None),
            memo: RefCell::new(Memo::Stale),
            snapshot_fn,
        })
    }

    /// Create a frame whose snapshot is plain concatenation.
    pub fn with_default_snapshot(
        start_time: f64,
        end_time: f64,
        events: &'a [CastEvent],
    ) -> Result<Self> {
        Self::new(start_time, end_time, events, identity_snapshot_fn())
    }

    /// Time of the first event.
    #[inline]
    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Exclusive upper bound of the frame.
    #[inline]
    #[must_use]
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// `end_time - start_time`.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// The events this frame covers (a view into the cast, not a copy).
    #[inline]
    #[must_use]
    pub fn events(&self) -> &'a [CastEvent] {
        self.events
    }

    /// Whether `time` falls inside `[start_time, end_time)`.
    #[inline]
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time
    }

    /// The predecessor frame, if linked and still alive.
    #[must_use]
    pub fn prev(&self) -> Option<Rc<CastFrame<'a>>> {
        self.prev.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Link this frame to a new predecessor.
    ///
    /// Relinking to a different frame clears the cached snapshot; relinking
    /// to the current predecessor is a no-op. Fails with
    /// [`FrameError::InvalidFrame`] if the link would make the chain cyclic.
    pub fn set_prev(&self, prev: Option<&Rc<CastFrame<'a>>>) -> Result<()> {
        let unchanged = match (self.prev.borrow().as_ref(), prev) {
            (None, None) => true,
            (Some(old), Some(new)) => std::ptr::eq(old.as_ptr(), Rc::as_ptr(new)),
            _ => false,
        };
        if unchanged {
            return Ok(());
        }

        if let Some(new) = prev {
            let mut cursor = Some(Rc::clone(new));
            while let Some(frame) = cursor {
                if std::ptr::eq(Rc::as_ptr(&frame), self) {
                    return Err(FrameError::InvalidFrame {
                        reason: "prev link would form a cycle",
                    });
                }
                cursor = frame.prev();
            }
        }

        self.link(prev);
        trace!(start_time = self.start_time, "Frame relinked, snapshot invalidated");
        Ok(())
    }

    /// Point `prev` at `prev` and clear the memo, without the cycle walk.
    ///
    /// Only for frames nothing links to yet, such as one just built by the
    /// queue: such a frame cannot be an ancestor of `prev`.
    pub(crate) fn link(&self, prev: Option<&Rc<CastFrame<'a>>>) {
        *self.prev.borrow_mut() = prev.map(Rc::downgrade);
        *self.memo.borrow_mut() = Memo::Stale;
    }

    /// Concatenated payloads of own events with `start < time <= end`.
    ///
    /// `start_time` defaults to negative infinity. `end_time` must lie in
    /// `[self.start_time, self.end_time)`; locate the covering frame with
    /// [`CastFrameQueue::frame`](crate::CastFrameQueue::frame) first.
    pub fn data(&self, end_time: f64, start_time: Option<f64>) -> Result<String> {
        if !self.contains(end_time) {
            return Err(FrameError::OutOfRange {
                time: end_time,
                start: self.start_time,
                end: self.end_time,
            });
        }
        let after = start_time.unwrap_or(f64::NEG_INFINITY);
        let mut out = String::new();
        for event in self.events {
            // Events are time-ordered, nothing later can match.
            if event.time > end_time {
                break;
            }
            if after < event.time {
                out.push_str(&event.data);
            }
        }
        Ok(out)
    }

    /// Whether the cumulative snapshot is currently memoized.
    #[must_use]
    pub fn is_snapshot_cached(&self) -> bool {
        matches!(*self.memo.borrow(), Memo::Computed(_))
    }

    /// Full terminal output from the start of the recording to `end_time`.
    ///
    /// Computed at most once per frame until the memo is invalidated. On a
    /// cold chain the walk goes back to the nearest memoized ancestor and
    /// fills every frame in between, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Rc<str> {
        if let Some(cached) = self.cached() {
            return cached;
        }

        let mut pending: Vec<Rc<CastFrame<'a>>> = Vec::new();
        let mut base: Option<Rc<str>> = None;
        let mut cursor = self.prev();
        while let Some(frame) = cursor {
            if let Some(cached) = frame.cached() {
                base = Some(cached);
                break;
            }
            cursor = frame.prev();
            pending.push(frame);
        }

        trace!(
            start_time = self.start_time,
            cold_ancestors = pending.len(),
            "Computing frame snapshot"
        );
        for frame in pending.iter().rev() {
            base = Some(frame.compose(base.as_deref()));
        }
        self.compose(base.as_deref())
    }

    fn cached(&self) -> Option<Rc<str>> {
        match &*self.memo.borrow() {
            Memo::Computed(s) => Some(Rc::clone(s)),
            Memo::Stale => None,
        }
    }

    fn own_data(&self) -> String {
        self.events.iter().map(|e| e.data.as_str()).collect()
    }

    fn compose(&self, prev: Option<&str>) -> Rc<str> {
        let own = self.own_data();
        let value: Rc<str> = match prev {
            Some(prev) => {
                let mut joined = String::with_capacity(prev.len() + own.len());
                joined.push_str(prev);
                joined.push_str(&own);
                Rc::from((self.snapshot_fn)(&joined))
            }
            None => Rc::from(own),
        };
        *self.memo.borrow_mut() = Memo::Computed(Rc::clone(&value));
        value
    }
}
