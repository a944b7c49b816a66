//! Logging utilities

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Reads `RUST_LOG` like any `env_logger` backed binary. Panics if a logger
/// is already installed, so libraries should never call this.
pub fn init() {
    env_logger::init();
}

/// Initialize logging for tests
///
/// Safe to call from every test; only the first call installs the logger.
pub fn try_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
