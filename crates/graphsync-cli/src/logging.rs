//! Logging setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter for the requested verbosity
#[must_use]
pub fn filter_for(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Install the global subscriber. Call once per process.
pub fn setup_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter_for(verbose))
        .init();
}
