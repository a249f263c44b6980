//! Runtime core: futures, fan-out, shutdown and the launcher.
//!
//! The public API from this module is re-exported at the crate root.
//!
//! Internal modules:
//! - [`settle`]: write-once outcome cell shared by a task and its waiters;
//! - [`runner`]: runs one task with panic recovery and tracing;
//! - [`future`]: [`TaskFuture`] / [`ResultFuture`] for a single task;
//! - [`parallel`]: [`ParallelFuture`] / [`ParallelResultFuture`] for many tasks;
//! - [`shutdown`]: signal-driven graceful shutdown context;
//! - [`launcher`]: fluent [`Launcher`] returning a [`LaunchOutcome`];
//! - [`config`]: [`LaunchConfig`] applied by [`Launcher::from_config`].

mod config;
mod future;
mod launcher;
mod outcome;
mod parallel;
mod runner;
mod settle;
mod shutdown;

pub use config::LaunchConfig;
pub use future::{ResultFuture, TaskFuture};
pub use launcher::Launcher;
pub use outcome::LaunchOutcome;
pub use parallel::{Batch, ParallelFuture, ParallelResultFuture};
pub use shutdown::{
    DEFAULT_SHUTDOWN_GRACE, ShutdownHandle, ShutdownState, with_graceful_shutdown,
    with_graceful_shutdown_timeout,
};
