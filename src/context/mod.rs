//! # Execution context handed to every task.
//!
//! [`Context`] bundles what a task needs from its caller:
//! - **Cancellation**: a token tree; cancelling a context cancels all contexts derived from it.
//! - **Cause**: *why* the context was cancelled ([`TaskError::Timeout`], [`TaskError::Canceled`], ...).
//! - **Deadline**: the earliest timeout along the chain, if any.
//! - **Values**: arbitrary `Send + Sync` data under string keys, plus a dedicated [`Logger`] slot.
//!
//! ## Derivation
//! ```text
//! background ──► with_cancel()  ──► (child, CancelHandle)
//!            ──► with_timeout(d) ──► (child, CancelHandle)   // self-cancels with Timeout after d
//!            ──► with_value(k, v) / with_logger(l)            // same cancellation scope
//! ```
//!
//! ## Rules
//! - Cancellation flows **down** only; a child never cancels its parent.
//! - The first cancellation of a scope fixes its cause; later ones are ignored.
//! - Cancellation is cooperative: tasks observe [`Context::cancelled`] / [`Context::is_cancelled`].
//!
//! ## Example
//! ```rust
//! use launchkit::{Context, TaskError};
//!
//! let root = Context::background().with_value("region", "eu-west".to_string());
//! let (ctx, cancel) = root.with_cancel();
//!
//! assert_eq!(ctx.value::<String>("region").map(String::as_str), Some("eu-west"));
//! assert!(!ctx.is_cancelled());
//!
//! cancel.cancel_with(TaskError::fail("stop"));
//! assert_eq!(ctx.cause(), Some(TaskError::fail("stop")));
//! assert!(!root.is_cancelled());
//! ```

mod scope;
mod values;

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::logging::Logger;

use scope::Scope;
use values::ValueNode;

const LOGGER_KEY: &str = "logger";

/// Cancellable execution context with attached values.
///
/// Cheap to clone: clones share the cancellation scope and value chain.
#[derive(Clone)]
pub struct Context {
    scope: Arc<Scope>,
    values: Option<Arc<ValueNode>>,
    logger: Option<Logger>,
}

impl Context {
    /// Root context: never cancelled, no deadline, no values.
    pub fn background() -> Self {
        Self {
            scope: Scope::root(),
            values: None,
            logger: None,
        }
    }

    /// Derives a child context that can be cancelled through the returned handle.
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        self.derive(None)
    }

    /// Derives a child context that cancels itself with [`TaskError::Timeout`] after `timeout`.
    ///
    /// The returned handle cancels early and stops the timer. A timeout too large to be
    /// represented as an instant sets no deadline and never fires.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime (the timer is a spawned task).
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        let (ctx, handle) = self.derive(Instant::now().checked_add(timeout));
        let scope = Arc::clone(&ctx.scope);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    if scope.cancel_with(TaskError::Timeout { timeout }) {
                        tracing::debug!(timeout = ?timeout, "context deadline exceeded");
                    }
                }
                _ = scope.token.cancelled() => {}
            }
        });
        (ctx, handle)
    }

    /// Returns a context carrying `value` under `key`; newer bindings shadow older ones.
    ///
    /// An empty key is ignored and the context is returned unchanged.
    pub fn with_value<V>(&self, key: impl Into<Cow<'static, str>>, value: V) -> Context
    where
        V: Any + Send + Sync,
    {
        let key = key.into();
        if key.is_empty() {
            return self.clone();
        }
        Context {
            scope: Arc::clone(&self.scope),
            values: Some(ValueNode::push(&self.values, key, Arc::new(value))),
            logger: self.logger.clone(),
        }
    }

    /// Returns a context carrying `logger`.
    pub fn with_logger(&self, logger: Logger) -> Context {
        Context {
            scope: Arc::clone(&self.scope),
            values: self.values.clone(),
            logger: Some(logger),
        }
    }

    /// Looks up the newest value stored under `key` with type `T`.
    pub fn value<T: Any>(&self, key: &str) -> Option<&T> {
        ValueNode::find(&self.values, key)
    }

    /// Keys currently bound, newest first (shadowed keys appear more than once).
    pub fn keys(&self) -> Vec<&str> {
        ValueNode::keys(&self.values)
    }

    /// Logger attached with [`Context::with_logger`], if any.
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    /// Logger attached to the context, or [`TaskError::Missing`].
    pub fn require_logger(&self) -> Result<&Logger, TaskError> {
        self.logger.as_ref().ok_or(TaskError::Missing {
            key: Cow::Borrowed(LOGGER_KEY),
        })
    }

    /// Returns `true` once this context (or any ancestor) has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.scope.token.is_cancelled()
    }

    /// Completes when this context is cancelled.
    pub async fn cancelled(&self) {
        self.scope.token.cancelled().await
    }

    /// Why the context was cancelled; `None` while it is still live.
    pub fn cause(&self) -> Option<TaskError> {
        self.scope.cause()
    }

    /// Earliest deadline along the derivation chain.
    pub fn deadline(&self) -> Option<Instant> {
        self.scope.deadline()
    }

    /// Child [`CancellationToken`] for code that speaks `tokio_util` directly.
    ///
    /// Cancelling the returned token does not cancel this context.
    pub fn token(&self) -> CancellationToken {
        self.scope.token.child_token()
    }

    fn derive(&self, deadline: Option<Instant>) -> (Context, CancelHandle) {
        let scope = self.scope.child(deadline);
        let handle = CancelHandle {
            scope: Arc::clone(&scope),
        };
        let ctx = Context {
            scope,
            values: self.values.clone(),
            logger: self.logger.clone(),
        };
        (ctx, handle)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline())
            .field("keys", &self.keys())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Cancels the context it was returned with.
///
/// Cloning the handle is allowed; all clones cancel the same scope.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    scope: Arc<Scope>,
}

impl CancelHandle {
    /// Cancels with [`TaskError::Canceled`]. Returns `false` if already cancelled.
    pub fn cancel(&self) -> bool {
        self.scope.cancel_with(TaskError::Canceled)
    }

    /// Cancels with an explicit cause. Returns `false` if already cancelled.
    pub fn cancel_with(&self, cause: TaskError) -> bool {
        self.scope.cancel_with(cause)
    }

    /// Returns `true` once the associated context is cancelled (by this handle or an ancestor).
    pub fn is_cancelled(&self) -> bool {
        self.scope.token.is_cancelled()
    }
}
