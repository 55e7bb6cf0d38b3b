//! Structured logging setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber. `RUST_LOG` wins over the configured
/// level so operators can raise verbosity without editing config.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
