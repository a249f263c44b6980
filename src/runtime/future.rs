//! # TaskFuture: handle to one asynchronously running task.
//!
//! [`TaskFuture::spawn`] starts the task **immediately** on its own Tokio task and returns a
//! handle whose [`wait`](TaskFuture::wait) resolves with the task's outcome.
//!
//! ## Lifecycle
//! ```text
//! spawn(ctx, task)
//!   ├─► derive child context from ctx
//!   ├─► tokio::spawn(run_guarded(task, child))       (starts now)
//!   │         └─► settle(outcome) ─► cancel(child)   (release derived resources)
//!   └─► TaskFuture { child, settlement }
//!
//! wait()
//!   ├─ settlement settled        ─► outcome
//!   └─ child cancelled first     ─► settle(Err(cause)) ─► cause   (timeout / signal / parent cancel)
//! ```
//!
//! ## Rules
//! - The outcome is settled **once**; every `wait()` (concurrent or later) returns the same value.
//! - A panic in the task resolves the future with [`TaskError::Panicked`].
//! - Cancellation is cooperative: if the parent context is cancelled, `wait()` returns the cause
//!   right away while a task that ignores its context keeps running in the background.

use std::sync::Arc;

use crate::context::{CancelHandle, Context};
use crate::error::TaskError;
use crate::runtime::{runner, settle::Settlement};
use crate::tasks::Task;

/// Future for a task producing `T` (use `TaskFuture` / `TaskFuture<()>` for plain tasks).
///
/// ## Example
/// ```rust
/// use launchkit::{Context, ResultFuture, TaskError, TaskFn, TaskRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let answer: TaskRef<u32> = TaskFn::arc("answer", |_ctx: Context| async move {
///     Ok::<_, TaskError>(42)
/// });
///
/// let fut = ResultFuture::spawn(&Context::background(), answer);
/// assert_eq!(fut.wait().await, Ok(42));
/// assert_eq!(fut.wait().await, Ok(42)); // settled outcomes are re-readable
/// # }
/// ```
#[derive(Debug)]
pub struct TaskFuture<T = ()> {
    ctx: Context,
    settlement: Arc<Settlement<T>>,
}

/// Value-producing variant of [`TaskFuture`].
pub type ResultFuture<T> = TaskFuture<T>;

impl<T> TaskFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts `task` with a context derived from `parent` and returns its future.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn spawn<Tk>(parent: &Context, task: Arc<Tk>) -> Self
    where
        Tk: Task<T> + ?Sized,
    {
        let (ctx, cancel) = parent.with_cancel();
        let settlement = Arc::new(Settlement::new());

        let task_ctx = ctx.clone();
        let slot = Arc::clone(&settlement);
        tokio::spawn(async move {
            let res = runner::run_guarded(task.as_ref(), task_ctx).await;
            release(&slot, &cancel, res);
        });

        Self { ctx, settlement }
    }

    /// Runs a synchronous closure on the blocking pool and returns its future.
    ///
    /// Same settlement and panic semantics as [`TaskFuture::spawn`]; use it for work that
    /// blocks the thread (file I/O, CPU-heavy parsing) instead of an async task.
    pub fn spawn_blocking<F>(parent: &Context, name: &str, f: F) -> Self
    where
        F: FnOnce(Context) -> Result<T, TaskError> + Send + 'static,
    {
        let (ctx, cancel) = parent.with_cancel();
        let settlement = Arc::new(Settlement::new());

        let task_ctx = ctx.clone();
        let slot = Arc::clone(&settlement);
        let name = name.to_owned();
        tokio::spawn(async move {
            let res = runner::run_blocking(&name, task_ctx, f).await;
            release(&slot, &cancel, res);
        });

        Self { ctx, settlement }
    }

    /// Waits for the task outcome.
    ///
    /// Returns the task's value or error, or the cause of the derived context if it was
    /// cancelled before the task finished.
    pub async fn wait(&self) -> Result<T, TaskError> {
        tokio::select! {
            biased;
            res = self.settlement.wait() => res,
            _ = self.ctx.cancelled() => {
                self.settlement
                    .settle(Err(self.ctx.cause().unwrap_or(TaskError::Canceled)));
                self.settlement.wait().await
            }
        }
    }

    /// Returns `true` once the outcome is fixed.
    pub fn is_settled(&self) -> bool {
        self.settlement.is_settled()
    }

    /// Context the task runs with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

fn release<T: Clone>(slot: &Settlement<T>, cancel: &CancelHandle, res: Result<T, TaskError>) {
    slot.settle(res);
    cancel.cancel();
}
