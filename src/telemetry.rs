use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Installs the global subscriber. `RUST_LOG` is read from the process
/// environment only, since logging starts before the `.env` file is read.
pub fn init() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
