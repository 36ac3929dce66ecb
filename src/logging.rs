//! Logging initialisation.
//!
//! Uses `tracing` with an environment-variable filter.  Set
//! `RUST_LOG=debug` (or e.g. `RUST_LOG=payroll_engine=trace`) to raise
//! the level; the default is `info`.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global subscriber for the CLI binary.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Initialise logging for tests.  Safe to call from several tests;
/// only the first call installs a subscriber.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
