//! Structured logging initialization.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use super::LogFormat;

/// Installs a global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `info`.
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_thread_names(true))
            .try_init(),
    }
}
