//! Subscriber setup for the command-line front end.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary. `RUST_LOG` overrides the level chosen here.

use anyhow::{Context as _, Result};
use tracing_subscriber::{EnvFilter, fmt};

/// Level used when `RUST_LOG` is unset: `info`, or `debug` with `-v`,
/// or `trace` with `-vv`.
#[must_use]
pub fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a stderr fmt subscriber.
///
/// # Errors
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init(verbose: u8) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose)))
        .context("Failed to create env filter")?;

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")
}
