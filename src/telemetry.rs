//! Global tracing subscriber installation.
//!
//! The teacher delegates this to `init4_bin_base::init4()`, an internal
//! crate pulled in purely for its metrics-exporter + subscriber wiring.
//! With that dependency dropped (see `DESIGN.md`), this repo installs its
//! own `tracing_subscriber::fmt` layer directly, reading `RUST_LOG` and
//! defaulting to `info`.

use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global `tracing` subscriber. Call once, at process start.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).try_init().map_err(|error| eyre::eyre!(error)).wrap_err("failed to install tracing subscriber")
}
