//! Diagnostic logging to stderr via `tracing`.
//!
//! `RUST_LOG` wins when set. Otherwise the level is `warn`, or `debug`
//! with `--verbose`.

use tracing_subscriber::EnvFilter;

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if verbose {
        tracing::debug!("Debug logging enabled");
    }
}
