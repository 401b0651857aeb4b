//! Tracing subscriber setup for the command-line front end.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary.

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a filter directive, e.g. `fractaleq=debug`.
pub const LOG_ENV: &str = "FRACTALEQ_LOG";

/// Pick the filter: explicit override, then [`LOG_ENV`], then `fallback`.
pub fn build_filter(explicit: Option<&str>, fallback: &str) -> EnvFilter {
    explicit
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
        .or_else(|| EnvFilter::try_new(fallback).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

/// Install a stderr formatter. A second call is a no-op.
pub fn init(explicit: Option<&str>, fallback: &str) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(build_filter(explicit, fallback))
        .with(fmt_layer)
        .try_init();
}
