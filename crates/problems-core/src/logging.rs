//! Tracing setup shared by processes embedding the client

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins over the configured level. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
