#![forbid(unsafe_code)]

//! Asciicast v2 loader.
//!
//! Reads newline-delimited JSON as written by asciinema and compatible
//! recorders. The first line is the header object, followed by event arrays
//! of the form `[time, "o", "text"]` for output and `[time, "i", "text"]`
//! for input. Only output events are kept: input never changes what is on
//! screen.
//!
//! # Example
//! ```
//! use castplay_frames::Cast;
//!
//! let text = "{\"version\":2,\"width\":80,\"height\":24}\n[0.5,\"o\",\"hi\"]\n";
//! let cast = Cast::from_str_v2(text).unwrap();
//! assert_eq!(cast.events.len(), 1);
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::cast::{Cast, CastEvent, CastHeader};

const SUPPORTED_VERSION: u8 = 2;
const OUTPUT_CODE: &str = "o";

/// Failures while loading an asciicast recording.
#[derive(Debug, Error)]
pub enum CastError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parse error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid asciicast header: {0}")]
    Header(String),

    #[error("invalid event on line {line}: {reason}")]
    Event { line: usize, reason: String },
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    version: u8,
    width: u16,
    height: u16,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    title: Option<String>,
}

impl Cast {
    /// Load an asciicast v2 file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CastError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let cast = Self::from_reader(BufReader::new(file))?;
        info!(
            path = ?path,
            events = cast.events.len(),
            duration_secs = cast.duration(),
            "Asciicast loaded"
        );
        Ok(cast)
    }

    /// Parse asciicast v2 text held in memory.
    pub fn from_str_v2(text: &str) -> Result<Self, CastError> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse asciicast v2 from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CastError> {
        let mut lines = BufReader::new(reader).lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((idx, line)) => {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    break parse_header(&line, idx + 1)?;
                }
                None => return Err(CastError::Header("missing header line".into())),
            }
        };

        let mut events = Vec::new();
        let mut skipped = 0usize;
        let mut last_time = 0.0_f64;
        for (idx, line) in lines {
            let line = line?;
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let (time, code, data): (f64, String, String) =
                serde_json::from_str(&line).map_err(|source| CastError::Json {
                    line: line_no,
                    source,
                })?;
            if !time.is_finite() || time < 0.0 {
                return Err(CastError::Event {
                    line: line_no,
                    reason: format!("time must be a non-negative number, got {time}"),
                });
            }
            if time < last_time {
                return Err(CastError::Event {
                    line: line_no,
                    reason: format!("time {time} precedes previous event at {last_time}"),
                });
            }
            last_time = time;
            if code != OUTPUT_CODE {
                skipped += 1;
                continue;
            }
            events.push(CastEvent { time, data });
        }

        debug!(
            width = header.width,
            height = header.height,
            events = events.len(),
            skipped = skipped,
            "Asciicast parsed"
        );
        Ok(Cast::from_events(header, events))
    }
}

fn parse_header(line: &str, line_no: usize) -> Result<CastHeader, CastError> {
    let raw: RawHeader = serde_json::from_str(line).map_err(|source| CastError::Json {
        line: line_no,
        source,
    })?;
    if raw.version != SUPPORTED_VERSION {
        return Err(CastError::Header(format!(
            "unsupported version {} (expected {SUPPORTED_VERSION})",
            raw.version
        )));
    }
    Ok(CastHeader {
        width: raw.width,
        height: raw.height,
        timestamp: raw.timestamp,
        title: raw.title,
    })
}
