#![forbid(unsafe_code)]

//! castplay public facade crate.
//!
//! Re-exports the frame queue (`castplay-frames`) and the playback clock
//! (`castplay-clock`), and composes them in [`Player`]: the clock says what
//! time it is, the queue says which frame covers that time, and the frame
//! says what is on screen.

use std::fmt;

// --- Frame re-exports ------------------------------------------------------

#[cfg(feature = "asciicast")]
pub use castplay_frames::CastError;
pub use castplay_frames::{
    Cast, CastEvent, CastFrame, CastFrameQueue, CastHeader, FrameError, FrameQueueOptions,
    SnapshotFn,
};

// --- Clock re-exports ------------------------------------------------------

pub use castplay_clock::{
    ClockError, ClockState, IntervalTicker, ManualTicker, PlaybackClock, RedrawTicker,
    TickCallback, TickSource,
};

pub mod config;
#[cfg(feature = "tracing-subscriber")]
pub mod logging;
pub mod player;

pub use config::{ConfigError, PlayerConfig};
pub use player::Player;

// --- Errors ---------------------------------------------------------------

/// Top-level error type for castplay.
#[derive(Debug)]
pub enum Error {
    /// Frame construction or lookup failure.
    Frame(FrameError),
    /// Rejected clock parameter.
    Clock(ClockError),
    /// Invalid or unreadable configuration.
    Config(ConfigError),
    /// Unreadable asciicast recording.
    #[cfg(feature = "asciicast")]
    Cast(CastError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(err) => write!(f, "{err}"),
            Self::Clock(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            #[cfg(feature = "asciicast")]
            Self::Cast(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame(err) => Some(err),
            Self::Clock(err) => Some(err),
            Self::Config(err) => Some(err),
            #[cfg(feature = "asciicast")]
            Self::Cast(err) => Some(err),
        }
    }
}

impl From<FrameError> for Error {
    fn from(err: FrameError) -> Self {
        Self::Frame(err)
    }
}

impl From<ClockError> for Error {
    fn from(err: ClockError) -> Self {
        Self::Clock(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "asciicast")]
impl From<CastError> for Error {
    fn from(err: CastError) -> Self {
        Self::Cast(err)
    }
}

/// Standard result type for castplay APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        Cast, CastEvent, ClockState, Error, IntervalTicker, ManualTicker, Player, PlayerConfig,
        RedrawTicker, Result, TickSource,
    };
}
