//! Tracing setup for binaries and examples embedding the crate.
//!
//! The library itself only emits `tracing` events; hosts decide how to
//! collect them. [`init`] wires up the conventional stack (env-filtered fmt
//! layer on stderr) for programs that do not need anything fancier.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a global subscriber: `RUST_LOG`-style filtering (defaulting to
/// `warn,flowscheme=info`) over a compact fmt layer.
///
/// Call once, early, from binaries or test harnesses. Calling it a second
/// time panics, as the global subscriber is already set.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,flowscheme=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Like [`init`], but quietly does nothing if a subscriber is already
/// installed. Handy in tests, where the first one wins.
pub fn try_init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,flowscheme=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
