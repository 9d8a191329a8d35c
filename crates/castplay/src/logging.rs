#![forbid(unsafe_code)]

//! Global tracing subscriber setup for binaries and demos.
//!
//! Libraries in this workspace only emit `tracing` events; installing a
//! subscriber is left to the application. [`init`] reads its filter from
//! `CASTPLAY_LOG` (same syntax as `RUST_LOG`) and falls back to `info`.
//! With the `tracing-json` feature each event is one JSON line.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CASTPLAY_LOG";

const DEFAULT_FILTER: &str = "info";

/// Filter from [`LOG_ENV`], or `info` when unset or invalid.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());
    #[cfg(feature = "tracing-json")]
    {
        builder.json().try_init()
    }
    #[cfg(not(feature = "tracing-json"))]
    {
        builder.try_init()
    }
}
