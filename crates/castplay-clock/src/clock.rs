#![forbid(unsafe_code)]

//! Playback clock: scaled time accumulated from a tick source.
//!
//! # State machine
//!
//! ```text
//!            start()             pause()
//! Stopped ──────────▶ Running ──────────▶ Paused
//!    ▲                 │  ▲                 │
//!    │     stop() /    │  └─────────────────┘
//!    │  duration hit   │       start()
//!    └─────────────────┘  (stop() also from Paused)
//! ```
//!
//! # Invariants
//!
//! 1. `time` only grows while `Running`, by the timescale current at each
//!    tick; a new timescale applies from the next tick.
//! 2. `0 <= time <= duration` when a duration is set.
//! 3. Every transition caused by `start`, `pause` or `stop` notifies state
//!    observers exactly once; repeated calls in the same state are no-ops.
//! 4. Hitting the duration stops the clock silently: tick observers see
//!    the clamped time, state observers are not called.
//! 5. After `stop()` returns the tick source delivers nothing more.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::error::ClockError;
use crate::ticker::{TickCallback, TickSource};

/// Run state of a [`PlaybackClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockState {
    /// Initial state, and the state after `stop()` or reaching the duration.
    Stopped,
    /// Accumulating ticks.
    Running,
    /// Ticks arrive but are ignored.
    Paused,
}

type TickObserver = Rc<dyn Fn(f64)>;
type StateObserver = Rc<dyn Fn(ClockState)>;

struct ClockCore {
    state: ClockState,
    time: f64,
    timescale: f64,
    duration: Option<f64>,
    delayed_ticks: u32,
    source: Box<dyn TickSource>,
    tick_observers: Vec<TickObserver>,
    state_observers: Vec<StateObserver>,
}

/// A controllable playback clock over a [`TickSource`].
pub struct PlaybackClock {
    core: Rc<RefCell<ClockCore>>,
}

impl fmt::Debug for PlaybackClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.core.borrow();
        f.debug_struct("PlaybackClock")
            .field("state", &core.state)
            .field("time", &core.time)
            .field("timescale", &core.timescale)
            .field("duration", &core.duration)
            .field("delayed_ticks", &core.delayed_ticks)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl PlaybackClock {
    /// Create an unbounded clock.
    #[must_use]
    pub fn new(source: Box<dyn TickSource>) -> Self {
        Self {
            core: Rc::new(RefCell::new(ClockCore {
                state: ClockState::Stopped,
                time: 0.0,
                timescale: 1.0,
                duration: None,
                delayed_ticks: 0,
                source,
                tick_observers: Vec::new(),
                state_observers: Vec::new(),
            })),
        }
    }

    /// Create a clock that saturates and stops at `duration` ticks.
    pub fn with_duration(source: Box<dyn TickSource>, duration: f64) -> Result<Self, ClockError> {
        if !(duration > 0.0) || !duration.is_finite() {
            return Err(ClockError::InvalidDuration(duration));
        }
        let clock = Self::new(source);
        clock.core.borrow_mut().duration = Some(duration);
        Ok(clock)
    }
}

// ---------------------------------------------------------------------------
// Playback control
// ---------------------------------------------------------------------------

impl PlaybackClock {
    /// Start or resume. No-op if already running.
    pub fn start(&self) {
        let observers = {
            let mut core = self.core.borrow_mut();
            if core.state == ClockState::Running {
                return;
            }
            let from = core.state;
            core.state = ClockState::Running;
            if !core.source.is_active() {
                let weak = Rc::downgrade(&self.core);
                let on_tick: TickCallback = Rc::new(move || {
                    if let Some(core) = weak.upgrade() {
                        handle_tick(&core);
                    }
                });
                core.source.start(on_tick);
            }
            debug!(from = ?from, time = core.time, "Clock started");
            core.state_observers.clone()
        };
        notify_state(&observers, ClockState::Running);
    }

    /// Pause. No-op unless running.
    pub fn pause(&self) {
        let observers = {
            let mut core = self.core.borrow_mut();
            if core.state != ClockState::Running {
                return;
            }
            core.state = ClockState::Paused;
            debug!(time = core.time, "Clock paused");
            core.state_observers.clone()
        };
        notify_state(&observers, ClockState::Paused);
    }

    /// Stop, reset time to zero and halt the tick source. No-op if stopped.
    pub fn stop(&self) {
        let observers = {
            let mut core = self.core.borrow_mut();
            if core.state == ClockState::Stopped {
                return;
            }
            core.state = ClockState::Stopped;
            core.time = 0.0;
            core.delayed_ticks = 0;
            core.source.stop();
            debug!("Clock stopped");
            core.state_observers.clone()
        };
        notify_state(&observers, ClockState::Stopped);
    }

    /// Swallow the next `n` ticks observed while running.
    ///
    /// Swallowed ticks neither advance `time` nor reach tick observers.
    /// A later call replaces any pending delay.
    pub fn delay(&self, n: u32) {
        let mut core = self.core.borrow_mut();
        core.delayed_ticks = n;
        trace!(ticks = n, "Clock delayed");
    }
}

// ---------------------------------------------------------------------------
// Time and speed
// ---------------------------------------------------------------------------

impl PlaybackClock {
    /// Accumulated playback time in tick units.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f64 {
        self.core.borrow().time
    }

    /// Jump to `time`, clamped to `[0, duration]`.
    ///
    /// Applies in any state and notifies tick observers synchronously with
    /// the clamped value. The run state is unchanged.
    pub fn set_time(&self, time: f64) {
        let (time, observers) = {
            let mut core = self.core.borrow_mut();
            // f64::max maps NaN to 0.
            let clamped = time.max(0.0);
            let clamped = core.duration.map_or(clamped, |d| clamped.min(d));
            core.time = clamped;
            trace!(requested = time, time = clamped, "Clock time set");
            (clamped, core.tick_observers.clone())
        };
        notify_tick(&observers, time);
    }

    /// Per-tick multiplier.
    #[inline]
    #[must_use]
    pub fn timescale(&self) -> f64 {
        self.core.borrow().timescale
    }

    /// Change the per-tick multiplier. Takes effect on the next tick.
    pub fn set_timescale(&self, timescale: f64) -> Result<(), ClockError> {
        if !(timescale > 0.0) || !timescale.is_finite() {
            return Err(ClockError::InvalidTimescale(timescale));
        }
        self.core.borrow_mut().timescale = timescale;
        debug!(timescale = timescale, "Clock timescale changed");
        Ok(())
    }

    /// Configured duration, if bounded.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.core.borrow().duration
    }

    /// `time / duration` in `[0, 1]`, or 0 when unbounded.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let core = self.core.borrow();
        core.duration
            .map_or(0.0, |d| (core.time / d).clamp(0.0, 1.0))
    }
}

// ---------------------------------------------------------------------------
// State queries and observers
// ---------------------------------------------------------------------------

impl PlaybackClock {
    /// Current run state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ClockState {
        self.core.borrow().state
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == ClockState::Running
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state() == ClockState::Paused
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state() == ClockState::Stopped
    }

    /// Raw counter of the underlying tick source.
    #[must_use]
    pub fn source_now(&self) -> u64 {
        self.core.borrow().source.now()
    }

    /// Observe every change of `time` (ticks and `set_time`).
    pub fn on_tick(&self, f: impl Fn(f64) + 'static) {
        self.core.borrow_mut().tick_observers.push(Rc::new(f));
    }

    /// Observe state transitions triggered by `start`, `pause` and `stop`.
    pub fn on_state_change(&self, f: impl Fn(ClockState) + 'static) {
        self.core.borrow_mut().state_observers.push(Rc::new(f));
    }
}

impl Drop for PlaybackClock {
    fn drop(&mut self) {
        if let Ok(mut core) = self.core.try_borrow_mut() {
            core.source.stop();
        }
    }
}

fn handle_tick(core: &Rc<RefCell<ClockCore>>) {
    let (time, observers) = {
        let Ok(mut core) = core.try_borrow_mut() else {
            warn!("Tick delivered while the clock was busy; dropped");
            return;
        };
        if core.state != ClockState::Running {
            return;
        }
        if core.delayed_ticks > 0 {
            core.delayed_ticks -= 1;
            trace!(remaining = core.delayed_ticks, "Delayed tick swallowed");
            return;
        }

        let raw = core.time + core.timescale;
        let (next, finished) = match core.duration {
            Some(duration) if raw > duration => (duration, true),
            _ => (raw, false),
        };
        core.time = next;
        if finished {
            // End of content: no state notification for this transition.
            core.state = ClockState::Stopped;
            core.source.stop();
            debug!(time = next, "Clock reached duration");
        } else {
            trace!(time = next, "Clock tick");
        }
        (next, core.tick_observers.clone())
    };
    notify_tick(&observers, time);
}

fn notify_tick(observers: &[TickObserver], time: f64) {
    for observer in observers {
        observer(time);
    }
}

fn notify_state(observers: &[StateObserver], state: ClockState) {
    for observer in observers {
        observer(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticker::ManualTicker;
    use std::cell::Cell;

    fn manual_clock() -> (ManualTicker, PlaybackClock) {
        let ticker = ManualTicker::new(1);
        let clock = PlaybackClock::new(Box::new(ticker.clone()));
        (ticker, clock)
    }

    fn bounded(duration: f64) -> (ManualTicker, PlaybackClock) {
        let ticker = ManualTicker::new(1);
        let clock = PlaybackClock::with_duration(Box::new(ticker.clone()), duration).unwrap();
        (ticker, clock)
    }

    fn record_ticks(clock: &PlaybackClock) -> Rc<RefCell<Vec<f64>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        clock.on_tick(move |t| sink.borrow_mut().push(t));
        seen
    }

    fn record_states(clock: &PlaybackClock) -> Rc<RefCell<Vec<ClockState>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        clock.on_state_change(move |s| sink.borrow_mut().push(s));
        seen
    }

    #[test]
    fn one_tick_advances_by_one() {
        let (ticker, clock) = manual_clock();
        clock.start();
        ticker.tick();
        assert_eq!(clock.time(), 1.0);
    }

    #[test]
    fn ticks_before_start_are_ignored() {
        let (ticker, clock) = manual_clock();
        ticker.tick_n(2);
        clock.start();
        ticker.tick_n(5);
        assert_eq!(clock.time(), 5.0);
    }

    #[test]
    fn timescale_set_before_start() {
        let (ticker, clock) = manual_clock();
        clock.set_timescale(2.0).unwrap();
        ticker.tick_n(2);
        clock.start();
        ticker.tick_n(5);
        assert_eq!(clock.time(), 10.0);
    }

    #[test]
    fn timescale_change_applies_to_next_tick() {
        let (ticker, clock) = manual_clock();
        clock.start();
        ticker.tick_n(3);
        clock.set_timescale(2.0).unwrap();
        ticker.tick_n(2);
        assert_eq!(clock.time(), 7.0);
    }

    #[test]
    fn timescale_changes_between_single_ticks() {
        let (ticker, clock) = manual_clock();
        clock.start();
        ticker.tick_n(3);
        clock.set_timescale(2.0).unwrap();
        ticker.tick();
        clock.set_timescale(3.0).unwrap();
        ticker.tick();
        assert_eq!(clock.time(), 8.0);
    }

    #[test]
    fn invalid_timescale_is_rejected_and_preserved() {
        let (_ticker, clock) = manual_clock();
        clock.set_timescale(1.5).unwrap();
        assert_eq!(
            clock.set_timescale(0.0),
            Err(ClockError::InvalidTimescale(0.0))
        );
        assert!(clock.set_timescale(-1.0).is_err());
        assert!(clock.set_timescale(f64::NAN).is_err());
        assert!(clock.set_timescale(f64::INFINITY).is_err());
        assert_eq!(clock.timescale(), 1.5);
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let ticker = ManualTicker::new(1);
        assert!(matches!(
            PlaybackClock::with_duration(Box::new(ticker.clone()), 0.0),
            Err(ClockError::InvalidDuration(_))
        ));
        assert!(PlaybackClock::with_duration(Box::new(ticker), f64::NAN).is_err());
    }

    #[test]
    fn pause_ignores_ticks_and_start_resumes() {
        let (ticker, clock) = manual_clock();
        clock.start();
        ticker.tick_n(3);
        clock.pause();
        ticker.tick_n(3);
        assert_eq!(clock.time(), 3.0);
        clock.start();
        ticker.tick_n(3);
        assert_eq!(clock.time(), 6.0);
    }

    #[test]
    fn state_queries_follow_transitions() {
        let (_ticker, clock) = manual_clock();
        assert!(clock.is_stopped());
        clock.start();
        assert!(clock.is_running());
        clock.pause();
        assert!(clock.is_paused());
        clock.stop();
        assert!(clock.is_stopped());
    }

    #[test]
    fn tick_observers_see_each_new_time() {
        let (ticker, clock) = manual_clock();
        let seen = record_ticks(&clock);
        ticker.tick_n(2);
        assert!(seen.borrow().is_empty());
        clock.start();
        ticker.tick_n(3);
        clock.pause();
        ticker.tick_n(3);
        clock.start();
        ticker.tick_n(3);
        assert_eq!(*seen.borrow(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn state_observers_fire_once_per_transition() {
        let (_ticker, clock) = manual_clock();
        let seen = record_states(&clock);
        clock.start();
        clock.start();
        clock.pause();
        clock.pause();
        clock.stop();
        clock.stop();
        clock.pause();
        clock.start();
        assert_eq!(
            *seen.borrow(),
            vec![
                ClockState::Running,
                ClockState::Paused,
                ClockState::Stopped,
                ClockState::Running,
            ]
        );
    }

    #[test]
    fn double_start_notifies_once() {
        let (_ticker, clock) = manual_clock();
        let seen = record_states(&clock);
        clock.start();
        clock.start();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn stop_resets_time_and_halts_source() {
        let (ticker, clock) = manual_clock();
        clock.start();
        ticker.tick_n(4);
        clock.stop();
        assert_eq!(clock.time(), 0.0);
        assert!(!ticker.is_active());
        ticker.tick_n(2);
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn set_time_clamps_and_notifies() {
        let (ticker, clock) = manual_clock();
        let seen = record_ticks(&clock);
        clock.start();
        ticker.tick_n(3);
        clock.set_time(0.0);
        assert_eq!(seen.borrow().last(), Some(&0.0));
        assert_eq!(clock.time(), 0.0);
        ticker.tick_n(3);
        assert_eq!(clock.time(), 3.0);

        clock.set_time(-5.0);
        assert_eq!(clock.time(), 0.0);
        assert!(clock.is_running());
    }

    #[test]
    fn set_time_works_while_stopped() {
        let (_ticker, clock) = bounded(10.0);
        let seen = record_ticks(&clock);
        clock.set_time(4.0);
        assert_eq!(clock.time(), 4.0);
        assert!(clock.is_stopped());
        assert_eq!(*seen.borrow(), vec![4.0]);
    }

    #[test]
    fn duration_saturates_and_stops_silently() {
        let (ticker, clock) = bounded(3.0);
        assert_eq!(clock.progress(), 0.0);
        let ticks = record_ticks(&clock);
        clock.start();
        let states = record_states(&clock);
        ticker.tick_n(5);

        assert_eq!(clock.time(), 3.0);
        assert_eq!(ticks.borrow().len(), 4);
        assert_eq!(*ticks.borrow(), vec![1.0, 2.0, 3.0, 3.0]);
        assert!(clock.is_stopped());
        assert!(states.borrow().is_empty());
        assert!(!ticker.is_active());

        clock.set_time(100.0);
        assert_eq!(clock.time(), 3.0);
        assert_eq!(clock.progress(), 1.0);
    }

    #[test]
    fn restart_after_duration_clamps_again() {
        let (ticker, clock) = bounded(3.0);
        clock.start();
        ticker.tick_n(5);
        let states = record_states(&clock);
        clock.start();
        ticker.tick_n(4);
        assert_eq!(clock.time(), 3.0);
        assert!(clock.is_stopped());
        assert_eq!(*states.borrow(), vec![ClockState::Running]);
    }

    #[test]
    fn progress_tracks_time() {
        let (ticker, clock) = bounded(4.0);
        clock.start();
        ticker.tick();
        assert_eq!(clock.progress(), 0.25);
        let (ticker, unbounded) = manual_clock();
        unbounded.start();
        ticker.tick_n(10);
        assert_eq!(unbounded.progress(), 0.0);
    }

    #[test]
    fn delay_swallows_ticks() {
        let (ticker, clock) = manual_clock();
        let seen = record_ticks(&clock);
        clock.start();
        ticker.tick();
        assert_eq!(*seen.borrow(), vec![1.0]);
        clock.delay(2);
        ticker.tick();
        ticker.tick();
        assert_eq!(*seen.borrow(), vec![1.0]);
        assert_eq!(clock.time(), 1.0);
        ticker.tick();
        ticker.tick();
        assert_eq!(*seen.borrow(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn paused_ticks_do_not_consume_delay() {
        let (ticker, clock) = manual_clock();
        clock.start();
        clock.delay(1);
        clock.pause();
        ticker.tick_n(3);
        clock.start();
        ticker.tick_n(2);
        assert_eq!(clock.time(), 1.0);
    }

    #[test]
    fn observers_run_in_registration_order() {
        let (ticker, clock) = manual_clock();
        let order = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let sink = Rc::clone(&order);
            clock.on_tick(move |_| sink.borrow_mut().push(id));
        }
        clock.start();
        ticker.tick();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn drop_halts_source() {
        let (ticker, clock) = manual_clock();
        clock.start();
        assert!(ticker.is_active());
        drop(clock);
        assert!(!ticker.is_active());
        assert!(!ticker.tick());
    }

    #[test]
    fn source_counter_is_exposed() {
        let (ticker, clock) = manual_clock();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        clock.on_tick(move |_| c.set(c.get() + 1));
        ticker.tick_n(3);
        assert_eq!(clock.source_now(), 3);
        assert_eq!(calls.get(), 0);
    }
}
