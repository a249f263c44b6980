//! Error type shared by tasks, futures and the launcher.
//!
//! Every failure the crate reports travels through [`TaskError`]: errors returned by tasks,
//! panics caught at the task boundary, deadlines, cancellation and builder validation.
//! Callers rarely need to match on it (log and exit is usually enough), but
//! [`TaskError::is_cancellation`] lets them tell orderly shutdown apart from real failures.
//!
//! The enum is `Clone` because a settled outcome is read by any number of waiters.

use std::borrow::Cow;
use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

/// # Errors produced by task execution and orchestration.
///
/// - `Fail`, `Panicked`: produced by the task body itself.
/// - `Timeout`, `Canceled`: produced by the execution [`Context`](crate::Context).
/// - `Invalid`, `Missing`: produced synchronously before anything runs.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task returned an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task panicked; the panic was caught at the task boundary.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Execution context deadline elapsed.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Execution context was cancelled (owner cancel or shutdown signal).
    #[error("context cancelled")]
    Canceled,

    /// Launcher input was rejected before any task was spawned.
    #[error("invalid launch: {reason}")]
    Invalid {
        /// Why the input was rejected.
        reason: Cow<'static, str>,
    },

    /// A value required from the execution context was not found.
    #[error("{key} not found in context")]
    Missing {
        /// Key that was looked up.
        key: Cow<'static, str>,
    },
}

impl TaskError {
    /// Wraps any displayable error as [`TaskError::Fail`].
    ///
    /// ```
    /// use launchkit::TaskError;
    ///
    /// let err = TaskError::fail("connection refused");
    /// assert_eq!(err.to_string(), "execution failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Builds a validation error.
    pub fn invalid(reason: impl Into<Cow<'static, str>>) -> Self {
        TaskError::Invalid {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use launchkit::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Canceled => "task_canceled",
            TaskError::Invalid { .. } => "launch_invalid",
            TaskError::Missing { .. } => "context_missing",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Canceled => "context cancelled".to_string(),
            TaskError::Invalid { reason } => format!("invalid: {reason}"),
            TaskError::Missing { key } => format!("missing: {key}"),
        }
    }

    /// True for [`TaskError::Canceled`], which almost always means orderly shutdown.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }

    /// True for [`TaskError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }

    /// Converts a caught panic payload into [`TaskError::Panicked`].
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let info = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskError::Panicked { info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(TaskError::fail("x").as_label(), "task_failed");
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
        assert_eq!(TaskError::invalid("nope").as_label(), "launch_invalid");
    }

    #[test]
    fn test_only_canceled_is_cancellation() {
        assert!(TaskError::Canceled.is_cancellation());
        assert!(
            !TaskError::Timeout {
                timeout: Duration::from_millis(5)
            }
            .is_cancellation()
        );
        assert!(!TaskError::fail("boom").is_cancellation());
    }

    #[test]
    fn test_panic_payloads() {
        let s: Box<dyn std::any::Any + Send> = Box::new("static boom");
        assert_eq!(
            TaskError::from_panic(s.as_ref()),
            TaskError::Panicked {
                info: "static boom".into()
            }
        );

        let owned: Box<dyn std::any::Any + Send> = Box::new(format!("boom {}", 7));
        assert_eq!(
            TaskError::from_panic(owned.as_ref()),
            TaskError::Panicked {
                info: "boom 7".into()
            }
        );

        let other: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert!(matches!(
            TaskError::from_panic(other.as_ref()),
            TaskError::Panicked { .. }
        ));
    }
}
