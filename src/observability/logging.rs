//! Structured logging initialization.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Level defaults to `info`,
/// overridable through `RUST_LOG`. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
