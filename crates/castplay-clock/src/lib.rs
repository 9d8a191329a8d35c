#![forbid(unsafe_code)]

//! Clock: tick-driven playback time for recorded terminal sessions.
//!
//! # Role in castplay
//! `castplay-clock` turns an abstract [`TickSource`] into a controllable
//! [`PlaybackClock`]: play / pause / stop, a runtime-adjustable speed
//! multiplier, seeking, and an optional duration with auto-stop. It knows
//! nothing about frames; a player composes it with `castplay-frames`.
//!
//! # Primary responsibilities
//! - **TickSource**: capability trait for anything that repeatedly calls
//!   back while running, with interval, redraw and manual implementations.
//! - **PlaybackClock**: the state machine that accumulates scaled ticks and
//!   notifies observers.
//!
//! Everything here is single-threaded and synchronous. Tick sources never
//! fire concurrently with themselves, and `stop()` guarantees no callback is
//! delivered after it returns.

pub mod clock;
pub mod error;
pub mod ticker;

pub use clock::{ClockState, PlaybackClock};
pub use error::ClockError;
pub use ticker::{
    DEFAULT_MAX_CATCH_UP, IntervalTicker, ManualTicker, RedrawTicker, TICK_INTERVAL, TickCallback,
    TickSource,
};
