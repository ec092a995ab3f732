//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Honors `RUST_LOG` when set, otherwise falls back to `default_level`.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    // A second init (tests, embedding apps) keeps the first logger.
    let _ = env_logger::Builder::from_env(env).try_init();
}
