//! Cancellation scope: a [`CancellationToken`] paired with the cause it was cancelled with.
//!
//! ## Rules
//! - A scope is cancelled **at most once** by its own owner; the first cause wins.
//! - Parent cancellation propagates through the token tree without touching the child's cause slot.
//! - `cause()` falls back to the nearest cancelled ancestor, then to [`TaskError::Canceled`].

use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

#[derive(Debug)]
pub(crate) struct Scope {
    pub(crate) token: CancellationToken,
    cause: Mutex<Option<TaskError>>,
    parent: Option<Arc<Scope>>,
    deadline: Option<Instant>,
}

impl Scope {
    pub(crate) fn root() -> Arc<Self> {
        Arc::new(Self {
            token: CancellationToken::new(),
            cause: Mutex::new(None),
            parent: None,
            deadline: None,
        })
    }

    pub(crate) fn child(self: &Arc<Self>, deadline: Option<Instant>) -> Arc<Self> {
        let deadline = match (self.deadline(), deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Arc::new(Self {
            token: self.token.child_token(),
            cause: Mutex::new(None),
            parent: Some(Arc::clone(self)),
            deadline,
        })
    }

    /// Cancels the scope with `cause` unless it is already cancelled.
    ///
    /// Returns `true` if this call performed the cancellation.
    pub(crate) fn cancel_with(&self, cause: TaskError) -> bool {
        let mut slot = self.cause.lock().unwrap_or_else(PoisonError::into_inner);
        if self.token.is_cancelled() {
            return false;
        }
        *slot = Some(cause);
        self.token.cancel();
        true
    }

    pub(crate) fn cause(&self) -> Option<TaskError> {
        if !self.token.is_cancelled() {
            return None;
        }
        let own = self
            .cause
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if own.is_some() {
            return own;
        }
        match &self.parent {
            Some(parent) => parent.cause().or(Some(TaskError::Canceled)),
            None => Some(TaskError::Canceled),
        }
    }

    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_cause_wins() {
        let scope = Scope::root();
        assert!(scope.cancel_with(TaskError::fail("first")));
        assert!(!scope.cancel_with(TaskError::fail("second")));
        assert_eq!(scope.cause(), Some(TaskError::fail("first")));
    }

    #[test]
    fn test_child_inherits_parent_cause() {
        let parent = Scope::root();
        let child = parent.child(None);
        assert_eq!(child.cause(), None);

        let timeout = TaskError::Timeout {
            timeout: Duration::from_millis(10),
        };
        parent.cancel_with(timeout.clone());

        assert!(child.token.is_cancelled());
        assert_eq!(child.cause(), Some(timeout));
        // Parent already cancelled the child; its own cancel is a no-op.
        assert!(!child.cancel_with(TaskError::fail("late")));
    }

    #[test]
    fn test_child_cancel_does_not_touch_parent() {
        let parent = Scope::root();
        let child = parent.child(None);
        child.cancel_with(TaskError::Canceled);
        assert!(!parent.token.is_cancelled());
        assert_eq!(parent.cause(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_takes_the_earliest() {
        let now = Instant::now();
        let root = Scope::root();
        let outer = root.child(Some(now + Duration::from_secs(1)));
        let inner = outer.child(Some(now + Duration::from_secs(5)));
        assert_eq!(inner.deadline(), Some(now + Duration::from_secs(1)));
        assert_eq!(root.deadline(), None);
    }
}
