//! Logging setup for the `nota` binary.
//!
//! `RUST_LOG` wins; otherwise the configured level applies. Logs go to
//! stderr so `nota encode` can write receipt bytes to stdout.

use std::str::FromStr;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Later calls are no-ops.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::from_str(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .try_init()
        .is_ok()
    {
        tracing::debug!(default_level, "logging initialized");
    }
}
