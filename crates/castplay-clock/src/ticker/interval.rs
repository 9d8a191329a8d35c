#![forbid(unsafe_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;
use web_time::Instant;

use super::{TickCallback, TickSource, TickerCore};

/// Default tick period.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Most ticks delivered by one poll; older backlog is dropped.
pub const DEFAULT_MAX_CATCH_UP: u32 = 8;

/// A fixed-period wall-clock ticker.
///
/// The host calls [`poll`](Self::poll) from its event loop. Each poll
/// delivers one tick per whole period elapsed since the last delivered
/// tick, up to `max_catch_up`; a larger backlog (for example after the host
/// was suspended) is dropped rather than replayed in a burst.
#[derive(Debug, Clone)]
pub struct IntervalTicker {
    core: TickerCore,
    period: Duration,
    max_catch_up: u32,
    anchor: Rc<Cell<Option<Instant>>>,
}

impl IntervalTicker {
    /// Create a ticker with [`TICK_INTERVAL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_period(TICK_INTERVAL)
    }

    /// Create a ticker with a custom period. A zero period is clamped to 1ns.
    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        Self {
            core: TickerCore::default(),
            period: period.max(Duration::from_nanos(1)),
            max_catch_up: DEFAULT_MAX_CATCH_UP,
            anchor: Rc::new(Cell::new(None)),
        }
    }

    /// Set the per-poll tick limit (builder pattern). Clamped to at least 1.
    #[must_use]
    pub fn max_catch_up(mut self, n: u32) -> Self {
        self.max_catch_up = n.max(1);
        self
    }

    /// Tick period.
    #[inline]
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Deliver ticks due at the current instant. Returns how many ran.
    pub fn poll(&self) -> u32 {
        self.poll_at(Instant::now())
    }

    /// Deliver ticks due at `now`. Returns how many ran.
    pub fn poll_at(&self, now: Instant) -> u32 {
        let Some(anchor) = self.anchor.get() else {
            return 0;
        };
        if !self.core.is_active() {
            return 0;
        }

        let elapsed = now.saturating_duration_since(anchor);
        let due = (elapsed.as_nanos() / self.period.as_nanos()).min(u128::from(u32::MAX)) as u32;
        if due == 0 {
            return 0;
        }

        let due = if due > self.max_catch_up {
            debug!(
                dropped = due - self.max_catch_up,
                period_ms = self.period.as_millis() as u64,
                "Interval ticker fell behind"
            );
            self.anchor.set(Some(now));
            self.max_catch_up
        } else {
            self.anchor.set(Some(anchor + self.period * due));
            due
        };

        let mut fired = 0;
        for _ in 0..due {
            // A callback may stop the ticker mid-batch.
            if !self.core.is_active() {
                break;
            }
            self.core.advance(1);
            if self.core.fire() {
                fired += 1;
            }
        }
        fired
    }
}

impl Default for IntervalTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for IntervalTicker {
    fn start(&mut self, on_tick: TickCallback) {
        self.start_at(on_tick, Instant::now());
    }

    fn stop(&mut self) {
        self.core.stop();
        self.anchor.set(None);
    }

    fn now(&self) -> u64 {
        self.core.now()
    }

    fn is_active(&self) -> bool {
        self.core.is_active()
    }
}

impl IntervalTicker {
    /// Start with an explicit reference instant.
    pub fn start_at(&mut self, on_tick: TickCallback, now: Instant) {
        if self.core.start(on_tick) {
            self.anchor.set(Some(now));
        }
    }
}
