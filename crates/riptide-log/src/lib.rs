//! Structured logging for the Riptide server.
//!
//! Span-based, filterable logging via the `tracing` ecosystem: console
//! output with uptime timestamps and module paths, level selection from the
//! config file with a `RUST_LOG` environment override.

use riptide_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info";

/// Initialize the tracing subscriber.
///
/// Filter precedence: `RUST_LOG` if set, then the config's
/// `debug.log_level`, then `info`. Call once at startup; a second call
/// panics (the global subscriber can only be installed once).
pub fn init_logging(config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(select_filter(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true) // the transport worker thread is named
        .with_level(true)
        .with_timer(fmt::time::uptime());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

/// An `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Pick the filter string for the subscriber: the config's `debug.log_level`
/// when present and non-empty, the default otherwise.
fn select_filter(config: Option<&Config>) -> &str {
    config
        .map(|config| config.debug.log_level.as_str())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
}
