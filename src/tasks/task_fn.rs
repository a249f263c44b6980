//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(Context) -> Fut`, producing a fresh future per run.
//! No state is shared between runs; if shared state is needed, capture an `Arc<...>`
//! explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use launchkit::{Context, TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef = TaskFn::arc("worker", |ctx: Context| async move {
//!     ctx.cancelled().await;
//!     Ok::<_, TaskError>(())
//! });
//! assert_eq!(t.name(), "worker");
//!
//! let sum: TaskRef<u32> = TaskFn::arc("sum", |_ctx: Context| async move {
//!     Ok::<_, TaskError>(1 + 2)
//! });
//! assert_eq!(sum.name(), "sum");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::TaskError;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per run.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, T> Task<T> for TaskFn<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: Context) -> Result<T, TaskError> {
        (self.f)(ctx).await
    }
}
