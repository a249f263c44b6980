//! # launchkit
//!
//! **launchkit** is a small async task orchestration core for Tokio services.
//!
//! It runs tasks under a cancellable [`Context`], recovers panics at the task boundary,
//! fans work out to many tasks and back in, and turns SIGINT/SIGTERM into orderly cancellation
//! with an optional grace period. The [`Launcher`] ties these together for `main` functions.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!        ┌────────────────────────────────────────────────────────┐
//!        │  Launcher (fluent builder)                             │
//!        │  - logger / values       ─► Context::with_logger/value │
//!        │  - graceful shutdown     ─► with_graceful_shutdown*    │
//!        │  - timeout (replaceable) ─► Context::with_timeout      │
//!        └───────────────┬───────────────────────────┬────────────┘
//!                        ▼ run_one                   ▼ run_all
//!               ┌─────────────────┐       ┌──────────────────────┐
//!               │   TaskFuture    │       │    ParallelFuture    │
//!               │ (one task)      │       │ (N tasks, 1 context) │
//!               └────────┬────────┘       └──────────┬───────────┘
//!                        ▼                           ▼
//!               ┌─────────────────────────────────────────────────┐
//!               │ run_guarded: catch_unwind ─► Result<T,TaskError>│
//!               └────────────────────────┬────────────────────────┘
//!                                        ▼
//!                              Settlement (write-once)
//!                                        ▼
//!                        wait() ─► LaunchOutcome ─► log_if_error
//! ```
//!
//! ### Cancellation
//! ```text
//! background
//!   └─► shutdown ctx   (SIGINT/SIGTERM ─► Canceled; grace elapsed ─► forced)
//!         └─► timeout ctx   (deadline ─► Timeout)
//!               └─► task ctx   (released when the task returns)
//! ```
//! Cancellation flows down only. The first cancellation of a context fixes its cause,
//! which is what `wait()` reports when a task is cut short.
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                              |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------------|
//! | **Context**       | Cancellation tree with causes, deadlines and values.         | [`Context`], [`CancelHandle`]                   |
//! | **Tasks**         | Define tasks as functions or trait impls.                    | [`Task`], [`TaskFn`], [`TaskRef`]               |
//! | **Futures**       | Run one task and wait for its outcome.                       | [`TaskFuture`], [`ResultFuture`]                |
//! | **Fan-out**       | Run many tasks and collect results in input order.           | [`ParallelFuture`], [`ParallelResultFuture`]    |
//! | **Shutdown**      | Signal-driven cancellation with grace-period escalation.     | [`with_graceful_shutdown`], [`ShutdownHandle`]  |
//! | **Launcher**      | Fluent setup and run for service entry points.               | [`Launcher`], [`LaunchOutcome`]                 |
//! | **Errors**        | One cloneable error for every failure path.                  | [`TaskError`]                                   |
//! | **Logging**       | Service-scoped structured logger over `tracing`.             | [`Logger`], [`ServiceGuard`]                    |
//! | **Configuration** | Centralize launcher settings.                                | [`LaunchConfig`]                                |
//!
//! ## Optional features
//! - `logging`: exports [`init_logging`], a `tracing-subscriber` setup with `RUST_LOG` filtering.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use launchkit::{Context, Launcher, Logger, TaskError, TaskFn, TaskRef};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), TaskError> {
//!     let logger = Logger::new().with_service("worker");
//!
//!     let ticker: TaskRef = TaskFn::arc("ticker", |ctx: Context| async move {
//!         let mut ticks = 0;
//!         while ticks < 3 {
//!             tokio::select! {
//!                 _ = ctx.cancelled() => return Err(ctx.cause().unwrap_or(TaskError::Canceled)),
//!                 _ = tokio::time::sleep(Duration::from_millis(5)) => ticks += 1,
//!             }
//!         }
//!         Ok(())
//!     });
//!
//!     let outcome = Launcher::new()
//!         .with_logger_context(logger.clone())
//!         .with_graceful_shutdown()
//!         .with_timeout(Duration::from_secs(5))
//!         .run_all([ticker])
//!         .await;
//!
//!     outcome.log_if_error(Some(&logger), "worker stopped");
//!     outcome.into_result()
//! }
//! ```
mod context;
mod error;
mod logging;
mod runtime;
mod tasks;

// ---- Public re-exports ----

pub use context::{CancelHandle, Context};
pub use error::TaskError;
pub use logging::{LogFormat, Logger, ServiceGuard};
pub use runtime::{
    Batch, DEFAULT_SHUTDOWN_GRACE, LaunchConfig, LaunchOutcome, Launcher, ParallelFuture,
    ParallelResultFuture, ResultFuture, ShutdownHandle, ShutdownState, TaskFuture,
    with_graceful_shutdown, with_graceful_shutdown_timeout,
};
pub use tasks::{Task, TaskFn, TaskRef};

// Optional: install a `tracing-subscriber` registry.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use logging::init_logging;
