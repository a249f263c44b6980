//! # Terminal result of a launcher run.

use crate::error::TaskError;
use crate::logging::Logger;

/// Outcome of [`Launcher::run_one`](crate::Launcher::run_one) / [`Launcher::run_all`](crate::Launcher::run_all).
///
/// ## Example
/// ```rust
/// use launchkit::{LaunchOutcome, Logger, TaskError};
///
/// let outcome = LaunchOutcome::from(Err(TaskError::Canceled));
/// assert!(!outcome.is_ok());
/// // Cancellation means orderly shutdown: nothing is logged.
/// assert!(!outcome.log_if_error(Some(&Logger::new()), "service stopped"));
/// ```
#[must_use = "a launch outcome carries the error of the run"]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchOutcome {
    error: Option<TaskError>,
}

impl LaunchOutcome {
    /// Error of the run, if any.
    pub fn error(&self) -> Option<&TaskError> {
        self.error.as_ref()
    }

    /// Returns `true` if every launched task succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into a `Result` for `?` propagation.
    pub fn into_result(self) -> Result<(), TaskError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Logs the error through `logger` unless there is none, no logger, or it is a cancellation.
    ///
    /// Returns whether anything was logged.
    pub fn log_if_error(&self, logger: Option<&Logger>, msg: &str) -> bool {
        match logger {
            Some(logger) => logger.log_if_error(self.error.as_ref(), msg),
            None => false,
        }
    }
}

impl From<Result<(), TaskError>> for LaunchOutcome {
    fn from(res: Result<(), TaskError>) -> Self {
        Self { error: res.err() }
    }
}
