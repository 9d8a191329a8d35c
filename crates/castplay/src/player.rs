#![forbid(unsafe_code)]

//! Player: a frame queue and a playback clock composed over one cast.
//!
//! The clock counts ticks; the player converts them to recording seconds
//! with the configured tick interval, asks the queue for the covering frame
//! and asks that frame for its content.
//!
//! # Usage
//!
//! ```
//! use castplay::{Cast, CastEvent, CastHeader, ManualTicker, Player, PlayerConfig};
//!
//! let cast = Cast::from_events(
//!     CastHeader::default(),
//!     vec![CastEvent::new(0.0, "$ "), CastEvent::new(0.02, "ls")],
//! );
//! let ticker = ManualTicker::new(1);
//! let player = Player::new(&cast, Box::new(ticker.clone()), &PlayerConfig::default()).unwrap();
//! player.play();
//! ticker.tick_n(2);
//! assert_eq!(player.screen().unwrap(), "$ ls");
//! ```

use castplay_clock::{ClockState, PlaybackClock, TickSource};
use castplay_frames::{Cast, CastFrameQueue};
use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::{Error, Result};

/// Plays one cast against one tick source.
#[derive(Debug)]
pub struct Player<'a> {
    queue: CastFrameQueue<'a>,
    clock: PlaybackClock,
    tick_seconds: f64,
    duration: f64,
}

impl<'a> Player<'a> {
    /// Build the frame queue for `cast` and a clock over `source`.
    ///
    /// The clock stops at `config.duration`, or at the cast's last event
    /// when unset. A cast with no extent plays unbounded.
    ///
    /// Each tick of `source` counts as `config.tick_interval_ms` of
    /// recording at timescale 1. The source must tick at that rate, or
    /// playback runs at the wrong speed; [`PlayerConfig::interval_ticker`]
    /// builds one that does.
    pub fn new(cast: &'a Cast, source: Box<dyn TickSource>, config: &PlayerConfig) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(Error::Config(crate::ConfigError::Validation(errors)));
        }

        let queue = CastFrameQueue::with_options(&cast.events, config.frame_queue_options())?;
        let tick_seconds = config.tick_seconds();
        let duration = config.duration.unwrap_or_else(|| cast.duration());
        let clock = if duration > 0.0 {
            PlaybackClock::with_duration(source, duration / tick_seconds)?
        } else {
            PlaybackClock::new(source)
        };
        clock.set_timescale(config.timescale)?;

        info!(
            events = cast.events.len(),
            frames = queue.len(),
            duration_secs = duration,
            tick_ms = config.tick_interval_ms,
            "Player ready"
        );
        Ok(Self {
            queue,
            clock,
            tick_seconds,
            duration,
        })
    }

    /// The frame queue.
    #[must_use]
    pub fn queue(&self) -> &CastFrameQueue<'a> {
        &self.queue
    }

    /// The playback clock, for observers and direct control.
    #[must_use]
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Playback length in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn play(&self) {
        self.clock.start();
    }

    pub fn pause(&self) {
        self.clock.pause();
    }

    /// Stop and rewind to the start.
    pub fn stop(&self) {
        self.clock.stop();
    }

    #[must_use]
    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    /// Playback speed multiplier.
    pub fn set_speed(&self, speed: f64) -> Result<()> {
        self.clock.set_timescale(speed)?;
        Ok(())
    }

    /// Jump to `seconds` (clamped to the playback range).
    ///
    /// Seeking to or past the duration lands exactly on the end.
    pub fn seek(&self, seconds: f64) {
        debug!(seconds = seconds, "Player seek");
        let ticks = match self.clock.duration() {
            Some(end) if seconds >= self.duration => end,
            _ => seconds / self.tick_seconds,
        };
        self.clock.set_time(ticks);
    }

    /// Current playback position in seconds.
    ///
    /// Exactly [`duration`](Self::duration) once the clock reaches its end,
    /// so the last event shows even when the tick conversion rounds down.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        let ticks = self.clock.time();
        match self.clock.duration() {
            Some(end) if ticks >= end => self.duration,
            _ => ticks * self.tick_seconds,
        }
    }

    /// Fraction of the playback length already played.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.clock.progress()
    }

    /// Terminal content at the current playback position.
    pub fn screen(&self) -> Result<String> {
        self.screen_at(self.current_time())
    }

    /// Terminal content at `seconds`: the previous frame's snapshot plus
    /// this frame's events up to `seconds`.
    pub fn screen_at(&self, seconds: f64) -> Result<String> {
        let Some(first) = self.queue.get(0) else {
            return Ok(String::new());
        };
        if seconds >= 0.0 && seconds < first.start_time() {
            return Ok(String::new());
        }

        let frame = self.queue.frame(seconds)?;
        if !frame.contains(seconds) {
            // Past the end of the recording.
            return Ok(frame.snapshot().to_string());
        }
        let mut out = frame
            .prev()
            .map(|prev| prev.snapshot().to_string())
            .unwrap_or_default();
        out.push_str(&frame.data(seconds, None)?);
        Ok(out)
    }

    /// Output written in `(from, to]`, for incremental painting.
    pub fn changes_since(&self, from: f64, to: f64) -> Result<String> {
        if self.queue.is_empty() || to <= from {
            return Ok(String::new());
        }
        let frame = self.queue.frame(to.max(0.0))?;
        if frame.contains(to) && from >= frame.start_time() {
            return Ok(frame.data(to, Some(from))?);
        }
        Ok(self
            .queue
            .frames()
            .flat_map(|f| f.events())
            .skip_while(|e| e.time <= from)
            .take_while(|e| e.time <= to)
            .map(|e| e.data.as_str())
            .collect())
    }
}
