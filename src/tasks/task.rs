//! # Task abstraction.
//!
//! A task receives a [`Context`] and should observe it to stop cooperatively during shutdown.
//! `Task` (unit output) is a plain service loop; `Task<T>` additionally yields a value.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::TaskError;

/// # Asynchronous, cancelable unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run) method that receives a [`Context`].
/// Implementors should regularly check cancellation and exit promptly during shutdown.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use launchkit::{Context, Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, ctx: Context) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Ok(());
///         }
///         // do work...
///         Ok(())
///     }
/// }
///
/// struct Answer;
///
/// #[async_trait]
/// impl Task<u64> for Answer {
///     fn name(&self) -> &str { "answer" }
///
///     async fn run(&self, _ctx: Context) -> Result<u64, TaskError> {
///         Ok(42)
///     }
/// }
/// ```
#[async_trait]
pub trait Task<T = ()>: Send + Sync + 'static
where
    T: Send + 'static,
{
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task until completion or cancellation.
    ///
    /// Implementations should watch `ctx.cancelled()` and exit quickly to honor graceful shutdown.
    async fn run(&self, ctx: Context) -> Result<T, TaskError>;
}

/// Shared handle to a task.
pub type TaskRef<T = ()> = Arc<dyn Task<T>>;
