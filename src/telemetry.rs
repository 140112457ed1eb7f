use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_LOGGER: Once = Once::new();

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default
/// `info` level.
pub fn init_logger_once() {
    INIT_LOGGER.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    });
}
