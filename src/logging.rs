//! Diagnostic logging.
//!
//! Results go to stdout; everything emitted through `tracing` goes to stderr
//! so the tables stay pipeable.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Build the filter. `RUST_LOG` wins over the CLI verbosity.
fn build_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose { "debug" } else { "warn" };
    EnvFilter::new(format!("{}={level},warn", env!("CARGO_CRATE_NAME")))
}

/// Install the global subscriber.
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_logging(verbose: bool, json: bool) {
    let subscriber = tracing_subscriber::registry().with(build_filter(verbose));

    if json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_target(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time();
        let _ = subscriber.with(fmt_layer).try_init();
    }

    tracing::debug!(verbose, json, "logging initialized");
}
