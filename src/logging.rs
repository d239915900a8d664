// src/logging.rs
//! Subscriber setup for binaries. The library itself only emits `tracing` events.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a fmt subscriber. `RUST_LOG` wins over `filter` when set.
/// Safe to call more than once.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(env_filter)
        .try_init()
        .ok();
}
