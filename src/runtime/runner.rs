//! # Run a single task body at the thread-of-execution boundary.
//!
//! Every spawned task, whether alone or inside a parallel set, goes through [`run_guarded`].
//!
//! - **Execute** the task once with the context it was given
//! - **Catch panics** (`catch_unwind`) and convert them to [`TaskError::Panicked`]
//! - **Log** the terminal state via `tracing`
//!
//! ## Log flow
//!
//! ```text
//! Success:       task.run() → Ok        → debug "task stopped"
//! Cancellation:  task.run() → Canceled  → debug "task stopped" (graceful exit)
//! Failure:       task.run() → Err(..)   → warn  "task failed"
//! Panic:         task.run() → unwind    → error "task panicked" → Err(Panicked)
//! ```
//!
//! ## Rules
//! - A panic never crosses the spawned-task boundary.
//! - `Canceled` is treated as a graceful exit, not a failure.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::{context::Context, error::TaskError, tasks::Task};

/// Runs `task` once with `ctx`, converting panics into errors.
pub(crate) async fn run_guarded<T, Tk>(task: &Tk, ctx: Context) -> Result<T, TaskError>
where
    T: Send + 'static,
    Tk: Task<T> + ?Sized,
{
    let name = task.name();
    tracing::debug!(task = name, "task starting");

    let res = match AssertUnwindSafe(task.run(ctx)).catch_unwind().await {
        Ok(res) => res,
        Err(payload) => {
            let err = TaskError::from_panic(payload.as_ref());
            tracing::error!(task = name, error = %err, "task panicked");
            return Err(err);
        }
    };

    match &res {
        Ok(_) => tracing::debug!(task = name, "task stopped"),
        Err(e) if e.is_cancellation() => {
            tracing::debug!(task = name, "task stopped on cancellation")
        }
        Err(e) => {
            tracing::warn!(task = name, error = %e, kind = e.as_label(), "task failed")
        }
    }
    res
}

/// Runs a blocking closure on Tokio's blocking pool, converting panics into errors.
pub(crate) async fn run_blocking<T, F>(name: &str, ctx: Context, f: F) -> Result<T, TaskError>
where
    T: Send + 'static,
    F: FnOnce(Context) -> Result<T, TaskError> + Send + 'static,
{
    tracing::debug!(task = name, "blocking task starting");
    match tokio::task::spawn_blocking(move || f(ctx)).await {
        Ok(res) => {
            if let Err(e) = &res {
                tracing::warn!(
                    task = name,
                    error = %e,
                    kind = e.as_label(),
                    "blocking task failed"
                );
            }
            res
        }
        Err(join) if join.is_panic() => {
            let err = TaskError::from_panic(join.into_panic().as_ref());
            tracing::error!(task = name, error = %err, "blocking task panicked");
            Err(err)
        }
        // Runtime is shutting down.
        Err(_) => Err(TaskError::Canceled),
    }
}
