//! Tracing setup shared by the Liftlog binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging at the default `info` level.
///
/// `RUST_LOG` overrides the level as usual.
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with a compact fmt layer and env-based filtering.
///
/// `default_level` applies when `RUST_LOG` is unset.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Logging for tests: captured output, debug level, safe to call repeatedly
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
