//! Diagnostic logging setup.
//!
//! The library only emits `tracing` events; the binary installs the
//! subscriber. Diagnostics go to stderr so stdout stays reserved for progress
//! lines and reports.
//!
//! | Flag | Filter |
//! |---|---|
//! | (none) | `warn` |
//! | `-v` | `debug` |
//! | `-vv` and more | `trace` |
//!
//! `RUST_LOG`, when set, takes precedence over the flags.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive for a `-v` count.
pub fn verbosity_to_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_filter(verbosity)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}
