//! Tracing subscriber setup.

use tracing::subscriber::set_global_default;
use tracing_subscriber::EnvFilter;

/// Installs a compact stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Returns
/// `false` when a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .finish();

    set_global_default(subscriber).is_ok()
}
