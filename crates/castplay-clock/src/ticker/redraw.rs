#![forbid(unsafe_code)]

use super::{TickCallback, TickSource, TickerCore};

/// A ticker driven by the host's display refresh.
///
/// The host calls [`on_redraw`](Self::on_redraw) from its frame callback
/// and keeps requesting frames while [`wants_redraw`](Self::wants_redraw)
/// is true. One tick per refresh; `now()` counts delivered ticks.
#[derive(Debug, Clone, Default)]
pub struct RedrawTicker {
    core: TickerCore,
}

impl RedrawTicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick for a display refresh. Returns whether it ran.
    pub fn on_redraw(&self) -> bool {
        if !self.core.is_active() {
            return false;
        }
        self.core.advance(1);
        self.core.fire()
    }

    /// Whether the host should schedule another refresh.
    #[must_use]
    pub fn wants_redraw(&self) -> bool {
        self.core.is_active()
    }
}

impl TickSource for RedrawTicker {
    fn start(&mut self, on_tick: TickCallback) {
        if self.core.start(on_tick) {
            tracing::trace!("Redraw ticker started");
        }
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
