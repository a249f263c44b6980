//! # Launcher configuration.
//!
//! Provides [`LaunchConfig`] centralized settings applied by [`Launcher::from_config`](crate::Launcher::from_config).
//!
//! ## Sentinel values
//! - `grace = 0s` → no forced cancellation after a shutdown signal
//! - `timeout = 0s` → no overall timeout

use std::time::Duration;

use crate::logging::LogFormat;
use crate::runtime::shutdown::DEFAULT_SHUTDOWN_GRACE;

/// Settings for a [`Launcher`](crate::Launcher).
///
/// ## Field semantics
/// - `graceful_shutdown`: cancel the launch context on SIGINT/SIGTERM
/// - `grace`: how long after the signal before cancellation is forced (`0s` = never)
/// - `timeout`: overall deadline for the launched tasks (`0s` = none)
/// - `log_format`: format used by [`init_logging`](crate::init_logging) _(feature `logging`)_
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct LaunchConfig {
    /// Whether to arm a graceful-shutdown context.
    pub graceful_shutdown: bool,

    /// Grace period after a shutdown signal.
    ///
    /// When a shutdown signal is received:
    /// - The launch context is cancelled
    /// - Tasks get up to `grace` to return
    /// - After that the context is cancelled again and the shutdown handle reports `Expired`
    pub grace: Duration,

    /// Overall timeout for the launched tasks.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = tasks see `TaskError::Timeout` once it elapses
    pub timeout: Duration,

    /// Output format for structured logs.
    pub log_format: LogFormat,
}

impl LaunchConfig {
    /// Returns the overall timeout as an `Option`.
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns the shutdown grace period as an `Option`.
    #[inline]
    pub fn grace_period(&self) -> Option<Duration> {
        if self.grace.is_zero() {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for LaunchConfig {
    /// Default configuration:
    ///
    /// - `graceful_shutdown = true`
    /// - `grace = 30s`
    /// - `timeout = 0s` (no timeout)
    /// - `log_format = Pretty`
    fn default() -> Self {
        Self {
            graceful_shutdown: true,
            grace: DEFAULT_SHUTDOWN_GRACE,
            timeout: Duration::ZERO,
            log_format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        let mut cfg = LaunchConfig::default();
        assert_eq!(cfg.default_timeout(), None);
        assert_eq!(cfg.grace_period(), Some(Duration::from_secs(30)));

        cfg.timeout = Duration::from_secs(5);
        cfg.grace = Duration::ZERO;
        assert_eq!(cfg.default_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.grace_period(), None);
    }
}
