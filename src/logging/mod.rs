//! # Logging: the [`Logger`] handle and optional subscriber setup.
//!
//! - [`Logger`] - structured, cloneable logger carried in a [`Context`](crate::Context).
//! - [`ServiceGuard`] - logs service `start`/`stop` around a scope.
//! - [`init_logging`] - installs a `tracing-subscriber` registry _(feature `logging`)_.

#[cfg(feature = "logging")]
mod init;
mod logger;

#[cfg(feature = "logging")]
pub use init::init_logging;
pub use logger::{Logger, ServiceGuard};

/// Output format for [`init_logging`](crate::init_logging).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, one event per line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}
