//! Diagnostic logging to stderr
//!
//! User-facing output goes through `styling`; tracing carries diagnostics
//! only. `RUST_LOG` takes precedence over the `-v` count.

use tracing_subscriber::{fmt, EnvFilter};

/// Log level for a `-v` count
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("churnscope={}", level_for_verbosity(verbose))));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
