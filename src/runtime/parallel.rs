//! # Fan-out / fan-in over many tasks.
//!
//! [`ParallelFuture`] and [`ParallelResultFuture`] start N tasks at once and resolve when
//! **all** of them have reported.
//!
//! ## Architecture
//! ```text
//! spawn_all(ctx, [t0, t1, .. tN-1])
//!   ├─► shared child context (parent cancel ─► every task sees it)
//!   ├─► tokio::spawn(run_guarded(t_i)) ──► tx.send((i, outcome))     one per task
//!   └─► aggregator:
//!         for _ in 0..N { (i, outcome) = rx.recv() }                 completion order
//!             ├─ Ok(v)  ─► values[i] = v                             input order
//!             └─ Err(e) ─► keep e if it is the first error seen
//!         settle(Batch { values, error }) ─► cancel(shared child)
//! ```
//!
//! ## Rules
//! - **Run to completion**: one failing task never cancels its siblings.
//! - **First observed error wins** (completion order, not input order); later errors are dropped.
//! - **Positional results**: slot `i` always belongs to task `i`; a failed slot holds `T::default()`.
//! - A task that returns `Ok` after the shared context was cancelled reports the context's cause.
//! - **Zero tasks** settle immediately with success and spawn nothing.
//! - If the parent context is cancelled first, `wait()` returns its cause without waiting for stragglers.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::context::Context;
use crate::error::TaskError;
use crate::runtime::{runner, settle::Settlement};
use crate::tasks::TaskRef;

/// Positional results of a parallel run plus the first error observed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Batch<T> {
    /// One slot per input task, in input order.
    pub values: Vec<T>,
    /// First error in completion order, if any task failed.
    pub error: Option<TaskError>,
}

/// Runs many value-producing tasks in parallel and collects their results in input order.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use launchkit::{Context, ParallelResultFuture, TaskError, TaskFn, TaskRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let slow: TaskRef<u32> = TaskFn::arc("slow", |_ctx: Context| async move {
///     tokio::time::sleep(Duration::from_millis(20)).await;
///     Ok::<_, TaskError>(10)
/// });
/// let fast: TaskRef<u32> = TaskFn::arc("fast", |_ctx: Context| async move {
///     tokio::time::sleep(Duration::from_millis(10)).await;
///     Ok::<_, TaskError>(20)
/// });
///
/// let fut = ParallelResultFuture::spawn_all(&Context::background(), vec![slow, fast]);
/// assert_eq!(fut.wait().await, Ok(vec![10, 20]));
/// # }
/// ```
#[derive(Debug)]
pub struct ParallelResultFuture<T> {
    ctx: Context,
    settlement: Arc<Settlement<Batch<T>>>,
    len: usize,
}

impl<T> ParallelResultFuture<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    /// Starts every task with one shared context derived from `parent`.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (unless `tasks` is empty).
    pub fn spawn_all(parent: &Context, tasks: Vec<TaskRef<T>>) -> Self {
        let (ctx, cancel) = parent.with_cancel();
        let len = tasks.len();

        if tasks.is_empty() {
            cancel.cancel();
            return Self {
                ctx,
                settlement: Arc::new(Settlement::settled(Ok(Batch::default()))),
                len,
            };
        }

        let (tx, mut rx) = mpsc::channel::<(usize, Result<T, TaskError>)>(len);
        for (index, task) in tasks.into_iter().enumerate() {
            let tx = tx.clone();
            let task_ctx = ctx.clone();
            tokio::spawn(async move {
                let res = match runner::run_guarded(task.as_ref(), task_ctx.clone()).await {
                    Ok(_) if task_ctx.is_cancelled() => {
                        Err(task_ctx.cause().unwrap_or(TaskError::Canceled))
                    }
                    res => res,
                };
                let _ = tx.send((index, res)).await;
            });
        }
        drop(tx);

        let settlement = Arc::new(Settlement::new());
        let slot = Arc::clone(&settlement);
        tokio::spawn(async move {
            let mut values = vec![T::default(); len];
            let mut first_error: Option<TaskError> = None;
            let mut reported = 0usize;

            while let Some((index, res)) = rx.recv().await {
                reported += 1;
                match res {
                    Ok(v) => values[index] = v,
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
                if reported == len {
                    break;
                }
            }
            if reported < len {
                // Senders vanished without reporting: the runtime dropped the tasks.
                first_error.get_or_insert(TaskError::Canceled);
            }

            tracing::debug!(
                tasks = len,
                failed = first_error.is_some(),
                "parallel tasks reported"
            );
            slot.settle(Ok(Batch {
                values,
                error: first_error,
            }));
            cancel.cancel();
        });

        Self {
            ctx,
            settlement,
            len,
        }
    }

    /// Waits for all tasks; `Err` carries the first error observed.
    pub async fn wait(&self) -> Result<Vec<T>, TaskError> {
        let batch = self.wait_batch().await?;
        match batch.error {
            Some(e) => Err(e),
            None => Ok(batch.values),
        }
    }

    /// Waits for all tasks and returns the positional results even if some task failed.
    ///
    /// If the parent context was cancelled before all tasks reported, the vector is empty.
    pub async fn wait_partial(&self) -> (Vec<T>, Option<TaskError>) {
        match self.wait_batch().await {
            Ok(batch) => (batch.values, batch.error),
            Err(e) => (Vec::new(), Some(e)),
        }
    }

    async fn wait_batch(&self) -> Result<Batch<T>, TaskError> {
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

    /// Number of tasks in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a set created with no tasks.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` once the outcome is fixed.
    pub fn is_settled(&self) -> bool {
        self.settlement.is_settled()
    }

    /// Shared context the tasks run with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

/// Runs many plain tasks in parallel; resolves with the first error observed, if any.
///
/// ## Example
/// ```rust
/// use launchkit::{Context, ParallelFuture, TaskError, TaskFn, TaskRef};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let tasks: Vec<TaskRef> = vec![
///     TaskFn::arc("a", |_ctx: Context| async { Ok::<_, TaskError>(()) }),
///     TaskFn::arc("b", |_ctx: Context| async { Err::<(), _>(TaskError::fail("b failed")) }),
/// ];
/// let fut = ParallelFuture::spawn_all(&Context::background(), tasks);
/// assert_eq!(fut.wait().await, Err(TaskError::fail("b failed")));
/// # }
/// ```
#[derive(Debug)]
pub struct ParallelFuture {
    inner: ParallelResultFuture<()>,
}

impl ParallelFuture {
    /// Starts every task with one shared context derived from `parent`.
    pub fn spawn_all(parent: &Context, tasks: Vec<TaskRef>) -> Self {
        Self {
            inner: ParallelResultFuture::spawn_all(parent, tasks),
        }
    }

    /// Waits for all tasks; `Err` carries the first error observed.
    pub async fn wait(&self) -> Result<(), TaskError> {
        self.inner.wait().await.map(|_| ())
    }

    /// Number of tasks in the set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` for a set created with no tasks.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` once the outcome is fixed.
    pub fn is_settled(&self) -> bool {
        self.inner.is_settled()
    }

    /// Shared context the tasks run with.
    pub fn context(&self) -> &Context {
        self.inner.context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    fn sleeper(ms: u64, res: Result<(), TaskError>, done: Arc<AtomicUsize>) -> TaskRef {
        TaskFn::arc("sleeper", move |_ctx: Context| {
            let res = res.clone();
            let done = Arc::clone(&done);
            async move {
                sleep(Duration::from_millis(ms)).await;
                done.fetch_add(1, Ordering::SeqCst);
                res
            }
        })
    }

    fn value_after(ms: u64, res: Result<i32, TaskError>) -> TaskRef<i32> {
        TaskFn::arc("value", move |_ctx: Context| {
            let res = res.clone();
            async move {
                sleep(Duration::from_millis(ms)).await;
                res
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_in_parallel() {
        let done = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();
        let fut = ParallelFuture::spawn_all(
            &Context::background(),
            vec![
                sleeper(20, Ok(()), done.clone()),
                sleeper(30, Ok(()), done.clone()),
                sleeper(10, Ok(()), done.clone()),
            ],
        );

        assert_eq!(fut.wait().await, Ok(()));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(30));
        assert!(elapsed < Duration::from_millis(60), "took {elapsed:?}");
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_waits_for_all_siblings() {
        let done = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();
        let fut = ParallelFuture::spawn_all(
            &Context::background(),
            vec![
                sleeper(10, Ok(()), done.clone()),
                sleeper(20, Err(TaskError::fail("task2 failed")), done.clone()),
                sleeper(30, Ok(()), done.clone()),
            ],
        );

        assert_eq!(fut.wait().await, Err(TaskError::fail("task2 failed")));
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(done.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_observed_error_wins() {
        let done = Arc::new(AtomicUsize::new(0));
        let fut = ParallelFuture::spawn_all(
            &Context::background(),
            vec![
                sleeper(30, Err(TaskError::fail("late")), done.clone()),
                sleeper(10, Err(TaskError::fail("early")), done.clone()),
            ],
        );
        assert_eq!(fut.wait().await, Err(TaskError::fail("early")));
    }

    #[tokio::test]
    async fn test_empty_set_resolves_immediately() {
        let fut = ParallelFuture::spawn_all(&Context::background(), Vec::new());
        assert!(fut.is_empty());
        assert!(fut.is_settled());
        assert_eq!(fut.wait().await, Ok(()));

        let fut = ParallelResultFuture::<String>::spawn_all(&Context::background(), Vec::new());
        assert_eq!(fut.wait().await, Ok(Vec::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_keep_input_order() {
        let fut = ParallelResultFuture::spawn_all(
            &Context::background(),
            vec![
                value_after(20, Ok(10)),
                value_after(10, Ok(20)),
                value_after(30, Ok(30)),
            ],
        );
        assert_eq!(fut.len(), 3);
        assert_eq!(fut.wait().await, Ok(vec![10, 20, 30]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_results_on_failure() {
        let fut = ParallelResultFuture::spawn_all(
            &Context::background(),
            vec![
                value_after(10, Ok(100)),
                value_after(20, Err(TaskError::fail("task2 failed"))),
                value_after(30, Ok(300)),
            ],
        );

        let (values, error) = fut.wait_partial().await;
        assert_eq!(values, vec![100, 0, 300]);
        assert_eq!(error, Some(TaskError::fail("task2 failed")));
        assert_eq!(fut.wait().await, Err(TaskError::fail("task2 failed")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ok_after_shared_cancel_reports_cause() {
        let (parent, _timeout) = Context::background().with_timeout(Duration::from_millis(20));
        let fut = ParallelResultFuture::spawn_all(
            &parent,
            vec![value_after(5, Ok(7)), value_after(50, Ok(9))],
        );

        // No waiter yet: the batch is settled by the aggregator once both tasks reported.
        sleep(Duration::from_millis(100)).await;
        assert!(fut.is_settled());

        let (values, error) = fut.wait_partial().await;
        assert_eq!(values, vec![7, 0]);
        assert_eq!(
            error,
            Some(TaskError::Timeout {
                timeout: Duration::from_millis(20)
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_cancel_reaches_every_task() {
        let (parent, cancel) = Context::background().with_cancel();
        let observed = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<TaskRef> = (0..3)
            .map(|_| {
                let observed = Arc::clone(&observed);
                let t: TaskRef = TaskFn::arc("listener", move |ctx: Context| {
                    let observed = Arc::clone(&observed);
                    async move {
                        ctx.cancelled().await;
                        observed.fetch_add(1, Ordering::SeqCst);
                        Ok::<(), TaskError>(())
                    }
                });
                t
            })
            .collect();

        let fut = ParallelFuture::spawn_all(&parent, tasks);
        sleep(Duration::from_millis(5)).await;
        cancel.cancel();

        assert_eq!(fut.wait().await, Err(TaskError::Canceled));
        sleep(Duration::from_millis(1)).await;
        assert_eq!(observed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_panic_in_one_task_is_reported() {
        let tasks: Vec<TaskRef<u8>> = vec![
            TaskFn::arc("ok", |_ctx: Context| async { Ok::<_, TaskError>(1u8) }),
            TaskFn::arc("panics", |_ctx: Context| async {
                if true {
                    panic!("boom");
                }
                Ok::<_, TaskError>(2u8)
            }),
        ];
        let fut = ParallelResultFuture::spawn_all(&Context::background(), tasks);
        let (values, error) = fut.wait_partial().await;
        assert_eq!(values, vec![1, 0]);
        assert!(matches!(error, Some(TaskError::Panicked { .. })));
    }
}
