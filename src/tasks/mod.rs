//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for implementing async cancelable tasks (optionally producing a value)
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task<T>>`)

mod task;
mod task_fn;

pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
