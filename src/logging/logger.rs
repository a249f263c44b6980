//! # Logger handle passed through contexts and used by [`LaunchOutcome`](crate::LaunchOutcome).
//!
//! [`Logger`] is a thin, cloneable front over `tracing`: it carries a service name and a
//! list of structured fields and stamps them onto every event it emits.
//!
//! ## Example
//! ```rust
//! use launchkit::{Logger, TaskError};
//!
//! let logger = Logger::new().with_service("feeder").with_field("venue", "binance");
//!
//! // Cancellation is expected during shutdown and never logged.
//! assert!(!logger.log_if_error(Some(&TaskError::Canceled), "feeder stopped"));
//! assert!(logger.log_if_error(Some(&TaskError::fail("socket closed")), "feeder stopped"));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::TaskError;

/// Structured logger with a service name and fixed fields.
#[derive(Clone, Debug, Default)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

#[derive(Clone, Debug, Default)]
struct LoggerInner {
    service: Option<Cow<'static, str>>,
    fields: Vec<(Cow<'static, str>, String)>,
}

impl Logger {
    /// Creates a logger without service name or fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Service name stamped on every event.
    pub fn service(&self) -> Option<&str> {
        self.inner.service.as_deref()
    }

    /// Returns a copy bound to `service`.
    pub fn with_service(&self, service: impl Into<Cow<'static, str>>) -> Logger {
        let mut inner = (*self.inner).clone();
        inner.service = Some(service.into());
        Logger {
            inner: Arc::new(inner),
        }
    }

    /// Returns a service-bound logger and logs `start`; the guard logs `stop` when dropped.
    ///
    /// ```rust
    /// use launchkit::Logger;
    ///
    /// let (svc, _guard) = Logger::new().start_service("ohlc-generator");
    /// assert_eq!(svc.service(), Some("ohlc-generator"));
    /// ```
    pub fn start_service(&self, service: impl Into<Cow<'static, str>>) -> (Logger, ServiceGuard) {
        let logger = self.with_service(service);
        logger.info("start");
        (logger.clone(), ServiceGuard { logger })
    }

    /// Returns a copy with one more structured field.
    pub fn with_field(
        &self,
        key: impl Into<Cow<'static, str>>,
        value: impl fmt::Display,
    ) -> Logger {
        let mut inner = (*self.inner).clone();
        inner.fields.push((key.into(), value.to_string()));
        Logger {
            inner: Arc::new(inner),
        }
    }

    /// Returns a copy carrying `err` as the `error` field.
    pub fn with_error(&self, err: &TaskError) -> Logger {
        self.with_field("error", err)
    }

    /// Structured fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .fields
            .iter()
            .map(|(k, v)| (k.as_ref(), v.as_str()))
    }

    /// Logs `msg` at info level with the service name and fields.
    pub fn info(&self, msg: &str) {
        tracing::info!(
            service = self.service_label(),
            fields = %Fields(&self.inner.fields),
            "{msg}"
        );
    }

    /// Logs `msg` at warn level with the service name and fields.
    pub fn warn(&self, msg: &str) {
        tracing::warn!(
            service = self.service_label(),
            fields = %Fields(&self.inner.fields),
            "{msg}"
        );
    }

    /// Logs `msg` at error level with the service name and fields.
    pub fn error(&self, msg: &str) {
        tracing::error!(
            service = self.service_label(),
            fields = %Fields(&self.inner.fields),
            "{msg}"
        );
    }

    /// Logs `err` at error level, unconditionally.
    pub fn log_error(&self, err: &TaskError, msg: &str) {
        tracing::error!(
            service = self.service_label(),
            fields = %Fields(&self.inner.fields),
            error = %err,
            kind = err.as_label(),
            "{msg}"
        );
    }

    /// Logs `err` if present and not a cancellation; returns whether anything was logged.
    pub fn log_if_error(&self, err: Option<&TaskError>, msg: &str) -> bool {
        match err {
            Some(err) if !err.is_cancellation() => {
                self.log_error(err, msg);
                true
            }
            _ => false,
        }
    }

    fn service_label(&self) -> &str {
        self.service().unwrap_or("-")
    }
}

/// Logs `stop` for its service when dropped.
#[must_use = "dropping the guard logs `stop` immediately"]
#[derive(Debug)]
pub struct ServiceGuard {
    logger: Logger,
}

impl Drop for ServiceGuard {
    fn drop(&mut self) {
        self.logger.info("stop");
    }
}

struct Fields<'a>(&'a [(Cow<'static, str>, String)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}
