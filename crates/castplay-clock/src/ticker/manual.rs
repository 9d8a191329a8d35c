#![forbid(unsafe_code)]

use super::{TickCallback, TickSource, TickerCore};

/// A ticker advanced by hand.
///
/// `tick()` always advances `now()` by the configured step and, while
/// active, invokes the callback synchronously.
#[derive(Debug, Clone)]
pub struct ManualTicker {
    core: TickerCore,
    step: u64,
}

impl ManualTicker {
    /// Create a ticker that advances `now()` by `step` per tick.
    #[must_use]
    pub fn new(step: u64) -> Self {
        Self {
            core: TickerCore::default(),
            step,
        }
    }

    /// Advance one tick. Returns whether a callback ran.
    pub fn tick(&self) -> bool {
        self.core.advance(self.step);
        self.core.fire()
    }

    /// Advance `n` ticks. Returns how many callbacks ran.
    pub fn tick_n(&self, n: usize) -> usize {
        (0..n).filter(|_| self.tick()).count()
    }
}

impl Default for ManualTicker {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TickSource for ManualTicker {
    fn start(&mut self, on_tick: TickCallback) {
        self.core.start(on_tick);
    }

    fn stop(&mut self) {
        self.core.stop();
    }

    fn now(&self) -> u64 {
        self.core.now()
    }

    fn is_active(&self) -> bool {
        self.core.is_active()
    }
}
