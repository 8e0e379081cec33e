//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Reads the filter from `RUST_LOG`. Panics if a logger is already installed.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system unless a logger is already installed
///
/// Returns `true` if this call installed the logger.
pub fn try_init() -> bool {
    env_logger::try_init().is_ok()
}

/// Initialize logging with a default filter used when `RUST_LOG` is unset
pub fn init_with_default(filter: &str) -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init()
        .is_ok()
}
