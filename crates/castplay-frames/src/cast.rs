#![forbid(unsafe_code)]

//! Cast source: the recorded event log consumed by the frame queue.
//!
//! A [`Cast`] is fully loaded before playback; frames borrow sub-slices of
//! [`Cast::events`] and never copy payloads.

/// One timestamped chunk of terminal output.
#[derive(Debug, Clone, PartialEq)]
pub struct CastEvent {
    /// Seconds since the start of the recording.
    pub time: f64,
    /// Output text written to the terminal at `time`.
    pub data: String,
}

impl CastEvent {
    /// Create an output event.
    #[must_use]
    pub fn new(time: f64, data: impl Into<String>) -> Self {
        Self {
            time,
            data: data.into(),
        }
    }
}

/// Terminal metadata recorded alongside the events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastHeader {
    pub width: u16,
    pub height: u16,
    /// Seconds since UNIX epoch when recording started, if known.
    pub timestamp: Option<i64>,
    pub title: Option<String>,
}

impl Default for CastHeader {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            timestamp: None,
            title: None,
        }
    }
}

/// A recorded terminal session: header plus time-ordered output events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cast {
    pub header: CastHeader,
    pub events: Vec<CastEvent>,
}

impl Cast {
    /// Build a cast from events already in time order.
    #[must_use]
    pub fn from_events(header: CastHeader, events: Vec<CastEvent>) -> Self {
        Self { header, events }
    }

    /// Time of the last event, or 0 for an empty cast.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.time)
    }

    /// Number of output events.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the cast has no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether event times are non-negative and non-decreasing.
    #[must_use]
    pub fn is_time_ordered(&self) -> bool {
        self.events.first().is_none_or(|e| e.time >= 0.0)
            && self.events.windows(2).all(|w| w[0].time <= w[1].time)
    }
}
