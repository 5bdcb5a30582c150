//! `tracing`-backed logging setup.

use tracing_subscriber::EnvFilter;

/// Initialize a global `tracing` subscriber, honoring `RUST_LOG` if set and
/// falling back to `level` otherwise. Safe to call more than once (subsequent
/// calls are no-ops).
pub fn init_tracing(level: tracing::Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
