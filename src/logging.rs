//! Logging setup shared by all binaries.
//!
//! Logs always go to stderr; stdout is reserved for command output such as
//! the JSON printed by the query binaries.

use tracing_subscriber::EnvFilter;

/// Installs the global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence. Without it, `default_level` applies, raised
/// to `debug` when `debug` is set. Calling this twice is harmless.
pub fn init_logging(default_level: &str, debug: bool) {
    let level = if debug { "debug" } else { default_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
