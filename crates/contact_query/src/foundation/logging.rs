//! Logging utilities

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from the `RUST_LOG` environment variable.
pub fn init() {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Initialize logging, ignoring the error if a logger is already installed.
///
/// Suitable for tests, where several cases may race to install the logger.
pub fn try_init() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .try_init();
}
