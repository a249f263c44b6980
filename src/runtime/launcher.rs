//! # Launcher: fluent builder that prepares a context and runs tasks in it.
//!
//! ```text
//! Launcher::new()
//!   .with_logger_context(logger)            ─► ctx carries the logger
//!   .with_graceful_shutdown_timeout(grace)  ─► ctx cancelled on SIGINT/SIGTERM
//!   .with_context("region", "eu")           ─► ctx carries a value
//!   .with_timeout(d)                        ─► ctx cancelled with Timeout after d
//!   .run_all([t1, t2, t3]).await            ─► LaunchOutcome
//!        └─► drop(launcher): timeout released, shutdown listeners retired
//! ```
//!
//! ## Rules
//! - Builder steps apply in call order and return the launcher by value.
//! - **Timeouts replace, never stack.** Each `with_timeout` derives from the context as it was
//!   before any timeout, so `with_timeout(20ms).with_timeout(100ms)` allows 100ms.
//! - Input is validated **before** anything is spawned; invalid input yields [`TaskError::Invalid`].
//! - Terminal operations consume the launcher. Resources it owns are released on every path.

use std::any::Any;
use std::borrow::Cow;
use std::time::Duration;

use crate::context::{CancelHandle, Context};
use crate::error::TaskError;
use crate::logging::Logger;
use crate::runtime::config::LaunchConfig;
use crate::runtime::future::TaskFuture;
use crate::runtime::outcome::LaunchOutcome;
use crate::runtime::parallel::ParallelFuture;
use crate::runtime::shutdown::{self, ShutdownHandle};
use crate::tasks::TaskRef;

/// Fluent builder for running one or many tasks.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use launchkit::{Context, Launcher, Logger, TaskError, TaskFn, TaskRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let logger = Logger::new().with_service("ingest");
///
/// let task: TaskRef = TaskFn::arc("ingest", |ctx: Context| async move {
///     let region = ctx.value::<&str>("region").copied().unwrap_or("unknown");
///     ctx.require_logger()?.info(&format!("ingesting {region}"));
///     Ok::<(), TaskError>(())
/// });
///
/// let outcome = Launcher::new()
///     .with_logger_context(logger.clone())
///     .with_context("region", "eu-west")
///     .with_timeout(Duration::from_secs(5))
///     .run_one(task)
///     .await;
///
/// assert!(outcome.is_ok());
/// outcome.log_if_error(Some(&logger), "ingest failed");
/// # }
/// ```
#[derive(Debug)]
pub struct Launcher {
    ctx: Context,
    base: Context,
    timeout: Option<CancelHandle>,
    shutdown: Vec<ShutdownHandle>,
}

impl Launcher {
    /// Creates a launcher over [`Context::background`].
    pub fn new() -> Self {
        Self::from_context(Context::background())
    }

    /// Creates a launcher over an existing context.
    pub fn from_context(ctx: Context) -> Self {
        Self {
            ctx: ctx.clone(),
            base: ctx,
            timeout: None,
            shutdown: Vec::new(),
        }
    }

    /// Creates a launcher and applies `cfg`: graceful shutdown first, then the overall timeout.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime when `cfg` enables shutdown or a timeout.
    pub fn from_config(cfg: &LaunchConfig) -> Self {
        let mut launcher = Self::new();
        if cfg.graceful_shutdown {
            launcher = match cfg.grace_period() {
                Some(grace) => launcher.with_graceful_shutdown_timeout(grace),
                None => launcher.with_graceful_shutdown(),
            };
        }
        if let Some(timeout) = cfg.default_timeout() {
            launcher = launcher.with_timeout(timeout);
        }
        launcher
    }

    /// Attaches a logger to the context; `None` leaves the launcher unchanged.
    pub fn with_logger_context(mut self, logger: impl Into<Option<Logger>>) -> Self {
        if let Some(logger) = logger.into() {
            self.base = self.base.with_logger(logger.clone());
            self.ctx = self.ctx.with_logger(logger);
        }
        self
    }

    /// Cancels the context on SIGINT/SIGTERM.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn with_graceful_shutdown(self) -> Self {
        self.arm_shutdown(None)
    }

    /// Cancels the context on SIGINT/SIGTERM and forces cancellation if tasks are still
    /// running `grace` later. A zero `grace` behaves like [`Launcher::with_graceful_shutdown`].
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn with_graceful_shutdown_timeout(self, grace: Duration) -> Self {
        self.arm_shutdown(Some(grace))
    }

    /// Stores `value` under `key` in the context; an empty key is ignored.
    pub fn with_context<V>(mut self, key: impl Into<Cow<'static, str>>, value: V) -> Self
    where
        V: Any + Clone + Send + Sync,
    {
        let key = key.into();
        if key.is_empty() {
            return self;
        }
        self.base = self.base.with_value(key.clone(), value.clone());
        self.ctx = self.ctx.with_value(key, value);
        self
    }

    /// Sets the overall timeout, replacing any previous one. A zero duration is ignored.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            tracing::debug!("ignoring zero launch timeout");
            return self;
        }
        self.release_timeout();
        let (ctx, handle) = self.base.with_timeout(timeout);
        self.ctx = ctx;
        self.timeout = Some(handle);
        self
    }

    /// Removes the active timeout, if any.
    pub fn without_timeout(mut self) -> Self {
        if self.release_timeout() {
            self.ctx = self.base.clone();
        }
        self
    }

    /// Context the tasks will run with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Runs one task and waits for it.
    ///
    /// `None` is rejected with [`TaskError::Invalid`] and nothing runs.
    pub async fn run_one(self, task: impl Into<Option<TaskRef>>) -> LaunchOutcome {
        let Some(task) = task.into() else {
            return LaunchOutcome::from(Err(TaskError::invalid("task must be provided")));
        };

        tracing::debug!(task = task.name(), "launching task");
        let res = TaskFuture::spawn(&self.ctx, task).wait().await;
        LaunchOutcome::from(res)
    }

    /// Runs all tasks in parallel and waits for every one of them.
    ///
    /// An empty input or a `None` entry is rejected with [`TaskError::Invalid`] and nothing runs.
    /// Otherwise the outcome carries the first error observed.
    pub async fn run_all<I>(self, tasks: I) -> LaunchOutcome
    where
        I: IntoIterator,
        I::Item: Into<Option<TaskRef>>,
    {
        let tasks = match validate(tasks) {
            Ok(tasks) => tasks,
            Err(e) => return LaunchOutcome::from(Err(e)),
        };

        tracing::debug!(tasks = tasks.len(), "launching tasks");
        let res = ParallelFuture::spawn_all(&self.ctx, tasks).wait().await;
        LaunchOutcome::from(res)
    }

    fn arm_shutdown(mut self, grace: Option<Duration>) -> Self {
        let arm = |ctx: &Context| match grace {
            Some(grace) => shutdown::with_graceful_shutdown_timeout(ctx, grace),
            None => shutdown::with_graceful_shutdown(ctx),
        };

        let (base, handle) = arm(&self.base);
        self.shutdown.push(handle);
        if self.timeout.is_some() {
            let (ctx, handle) = arm(&self.ctx);
            self.shutdown.push(handle);
            self.ctx = ctx;
        } else {
            self.ctx = base.clone();
        }
        self.base = base;
        self
    }

    fn release_timeout(&mut self) -> bool {
        match self.timeout.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Launcher {
    fn drop(&mut self) {
        self.release_timeout();
        for handle in self.shutdown.drain(..) {
            handle.cancel();
        }
    }
}

fn validate<I>(tasks: I) -> Result<Vec<TaskRef>, TaskError>
where
    I: IntoIterator,
    I::Item: Into<Option<TaskRef>>,
{
    let mut out = Vec::new();
    for (i, task) in tasks.into_iter().enumerate() {
        let Some(task) = task.into() else {
            let reason = format!("task at index {i} must be provided");
            return Err(TaskError::invalid(reason));
        };
        out.push(task);
    }
    if out.is_empty() {
        return Err(TaskError::invalid("at least one task must be provided"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;

    fn noop() -> TaskRef {
        TaskFn::arc("noop", |_ctx: Context| async move {
            Ok::<(), TaskError>(())
        })
    }

    #[test]
    fn test_validate_rejects_empty_and_missing() {
        let empty: Vec<TaskRef> = Vec::new();
        assert_eq!(
            validate(empty).err(),
            Some(TaskError::invalid("at least one task must be provided"))
        );
        assert_eq!(
            validate(vec![Some(noop()), None, Some(noop())]).err(),
            Some(TaskError::invalid("task at index 1 must be provided"))
        );
        assert_eq!(validate(vec![noop(), noop()]).map(|v| v.len()), Ok(2));
    }

    #[tokio::test]
    async fn test_from_config_arms_shutdown() {
        let cfg = LaunchConfig {
            grace: Duration::ZERO,
            ..LaunchConfig::default()
        };
        let launcher = Launcher::from_config(&cfg);
        assert_eq!(launcher.shutdown.len(), 1);
        assert_eq!(launcher.shutdown[0].state(), shutdown::ShutdownState::Armed);
        assert!(launcher.context().deadline().is_none());

        let cfg = LaunchConfig {
            graceful_shutdown: false,
            ..LaunchConfig::default()
        };
        assert!(Launcher::from_config(&cfg).shutdown.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_runs_task() {
        let launcher = Launcher::new().with_timeout(Duration::MAX);
        assert!(launcher.context().deadline().is_none());
        assert!(launcher.run_one(noop()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_replaces_previous() {
        let launcher = Launcher::new().with_timeout(Duration::from_millis(20));
        let first = launcher.context().clone();

        let launcher = launcher.with_timeout(Duration::from_millis(100));
        assert!(first.is_cancelled());
        assert!(!launcher.context().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_is_noop() {
        let launcher = Launcher::new()
            .with_timeout(Duration::from_millis(20))
            .with_timeout(Duration::ZERO);
        assert!(launcher.context().deadline().is_some());

        let launcher = launcher.without_timeout();
        assert!(launcher.context().deadline().is_none());
        assert!(!launcher.context().is_cancelled());
    }

    #[tokio::test]
    async fn test_values_survive_timeout_changes() {
        let launcher = Launcher::new()
            .with_timeout(Duration::from_secs(5))
            .with_context("n", 7u8)
            .with_logger_context(Logger::new().with_service("svc"))
            .with_logger_context(None::<Logger>)
            .without_timeout();

        assert_eq!(launcher.context().value::<u8>("n"), Some(&7));
        assert_eq!(
            launcher.context().logger().and_then(|l| l.service()),
            Some("svc")
        );
    }

    #[tokio::test]
    async fn test_drop_retires_shutdown() {
        let launcher = Launcher::new()
            .with_graceful_shutdown()
            .with_timeout(Duration::from_secs(5))
            .with_graceful_shutdown_timeout(Duration::from_secs(1));
        assert_eq!(launcher.shutdown.len(), 3);

        let handles = launcher.shutdown.clone();
        let ctx = launcher.context().clone();
        drop(launcher);

        assert!(ctx.is_cancelled());
        for handle in handles {
            assert_eq!(handle.state(), shutdown::ShutdownState::Retired);
        }
    }
}
