#![forbid(unsafe_code)]

//! Player configuration.
//!
//! Every tunable of the frame queue, tick source and clock in one
//! [`PlayerConfig`], loadable from TOML or JSON with the `config` feature.
//!
//! # Loading
//!
//! ```toml
//! # castplay.toml
//! frame_events_step = 60
//! tick_interval_ms = 16
//! timescale = 1.5
//! ```
//!
//! ```rust,ignore
//! let config = PlayerConfig::from_toml_file("castplay.toml")?;
//! let config = PlayerConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `PlayerConfig::default()` matches the built-in constants of
//! `castplay-frames` and `castplay-clock`.

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use castplay_clock::{DEFAULT_MAX_CATCH_UP, IntervalTicker, TICK_INTERVAL};
use castplay_frames::{DEFAULT_FINAL_FRAME_EPSILON, DEFAULT_FRAME_EVENTS_STEP, FrameQueueOptions};

/// Tunables for a [`Player`](crate::Player).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PlayerConfig {
    /// Events per frame.
    pub frame_events_step: usize,
    /// Width in seconds of the last frame.
    pub final_frame_epsilon: f64,
    /// Wall-clock length of one tick.
    pub tick_interval_ms: u64,
    /// Most ticks an interval ticker delivers per poll.
    pub max_catch_up: u32,
    /// Initial playback speed.
    pub timescale: f64,
    /// Playback length in seconds; defaults to the cast's last event time.
    pub duration: Option<f64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            frame_events_step: DEFAULT_FRAME_EVENTS_STEP,
            final_frame_epsilon: DEFAULT_FINAL_FRAME_EPSILON,
            tick_interval_ms: TICK_INTERVAL.as_millis() as u64,
            max_catch_up: DEFAULT_MAX_CATCH_UP,
            timescale: 1.0,
            duration: None,
        }
    }
}

impl PlayerConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters.
    ///
    /// Returns a list of problems; empty means the config is usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.frame_events_step == 0 {
            errors.push("frame_events_step must be > 0".into());
        }
        if !(self.final_frame_epsilon > 0.0) || !self.final_frame_epsilon.is_finite() {
            errors.push(format!(
                "final_frame_epsilon must be > 0, got {}",
                self.final_frame_epsilon
            ));
        }
        if self.tick_interval_ms == 0 {
            errors.push("tick_interval_ms must be > 0".into());
        }
        if self.max_catch_up == 0 {
            errors.push("max_catch_up must be > 0".into());
        }
        if !(self.timescale > 0.0) || !self.timescale.is_finite() {
            errors.push(format!("timescale must be > 0, got {}", self.timescale));
        }
        match self.duration {
            Some(d) if !(d > 0.0) || !d.is_finite() => {
                errors.push(format!("duration must be > 0, got {d}"));
            }
            _ => {}
        }

        errors
    }

    /// `self` if valid, otherwise every problem found.
    pub fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Tick length as a [`Duration`].
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Seconds of recording per tick at timescale 1.
    #[must_use]
    pub fn tick_seconds(&self) -> f64 {
        self.tick_interval().as_secs_f64()
    }

    /// Frame queue options derived from this config.
    #[must_use]
    pub fn frame_queue_options(&self) -> FrameQueueOptions {
        FrameQueueOptions::default()
            .events_step(self.frame_events_step)
            .final_frame_epsilon(self.final_frame_epsilon)
    }

    /// An interval ticker with this config's period and catch-up limit.
    #[must_use]
    pub fn interval_ticker(&self) -> IntervalTicker {
        IntervalTicker::with_period(self.tick_interval()).max_catch_up(self.max_catch_up)
    }
}

/// Failures while loading a [`PlayerConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
