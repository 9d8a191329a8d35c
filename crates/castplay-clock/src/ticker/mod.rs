#![forbid(unsafe_code)]

//! Tick sources: things that repeatedly invoke a callback while running.
//!
//! A [`PlaybackClock`](crate::PlaybackClock) depends only on the
//! [`TickSource`] trait. Three implementations share one contract:
//!
//! | Source | Driven by |
//! |--------|-----------|
//! | [`IntervalTicker`] | wall clock, fixed period, polled from the host loop |
//! | [`RedrawTicker`] | the host's display refresh callback |
//! | [`ManualTicker`] | explicit `tick()` calls (tests, scripted playback) |
//!
//! Each is a cheap cloneable handle over shared state: the clock owns one
//! clone, the host keeps another to drive it.
//!
//! # Contract
//!
//! 1. `start` is idempotent while active; the first callback wins.
//! 2. After `stop` returns, no further callback is delivered.
//! 3. `now()` never decreases.
//! 4. Callbacks run synchronously and never overlap with each other.

mod interval;
mod manual;
mod redraw;

use std::cell::RefCell;
use std::rc::Rc;

pub use interval::{DEFAULT_MAX_CATCH_UP, IntervalTicker, TICK_INTERVAL};
pub use manual::ManualTicker;
pub use redraw::RedrawTicker;

/// Callback invoked on every tick.
pub type TickCallback = Rc<dyn Fn()>;

/// A source of discrete ticks.
pub trait TickSource {
    /// Begin delivering ticks to `on_tick`. No-op if already active.
    fn start(&mut self, on_tick: TickCallback);

    /// Stop delivering ticks. Idempotent.
    fn stop(&mut self);

    /// Monotonic tick counter.
    fn now(&self) -> u64;

    /// Whether a callback is currently installed.
    fn is_active(&self) -> bool;
}

#[derive(Default)]
struct TickerState {
    now: u64,
    callback: Option<TickCallback>,
}

/// Shared state behind every ticker handle.
#[derive(Clone, Default)]
pub(crate) struct TickerCore {
    inner: Rc<RefCell<TickerState>>,
}

impl TickerCore {
    /// Install the callback. Returns `false` if one was already installed.
    pub(crate) fn start(&self, on_tick: TickCallback) -> bool {
        let mut state = self.inner.borrow_mut();
        if state.callback.is_some() {
            return false;
        }
        state.callback = Some(on_tick);
        true
    }

    pub(crate) fn stop(&self) {
        self.inner.borrow_mut().callback = None;
    }

    pub(crate) fn is_active(&self) -> bool {
        self.inner.borrow().callback.is_some()
    }

    pub(crate) fn now(&self) -> u64 {
        self.inner.borrow().now
    }

    pub(crate) fn advance(&self, step: u64) {
        let mut state = self.inner.borrow_mut();
        state.now = state.now.saturating_add(step);
    }

    /// Invoke the callback once if active. Returns whether it ran.
    ///
    /// The callback is cloned out before the call so it may stop (or
    /// restart) this ticker from inside.
    pub(crate) fn fire(&self) -> bool {
        let callback = self.inner.borrow().callback.clone();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TickerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerCore")
            .field("now", &self.now())
            .field("active", &self.is_active())
            .finish()
    }
}
