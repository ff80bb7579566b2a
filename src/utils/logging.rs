//! Tracing subscriber setup for the CLI

use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing on stderr so stdout stays clean for command output.
/// - Respects `RUST_LOG` if set
/// - Falls back to `flowstate=debug` when verbose, `warn` otherwise
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,flowstate=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}
