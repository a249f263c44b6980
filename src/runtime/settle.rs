//! # Settlement: write-once, read-many outcome cell.
//!
//! A [`Settlement`] starts `Pending` and is settled exactly once with either a value or a
//! [`TaskError`]. Any number of waiters, concurrent or later, observe that same outcome.
//!
//! ## Rules
//! - **First settle wins**: later `settle` calls return `false` and change nothing.
//! - **Atomic outcome**: the value and error travel together in one state transition, so
//!   "is it done" and "what is the result" can never disagree.
//! - Built on [`tokio::sync::watch`]: settling never blocks and needs no receivers.

use tokio::sync::watch;

use crate::error::TaskError;

#[derive(Debug)]
enum State<T> {
    Pending,
    Success(T),
    Failed(TaskError),
}

impl<T: Clone> State<T> {
    fn is_pending(&self) -> bool {
        matches!(self, State::Pending)
    }

    fn to_result(&self) -> Option<Result<T, TaskError>> {
        match self {
            State::Pending => None,
            State::Success(v) => Some(Ok(v.clone())),
            State::Failed(e) => Some(Err(e.clone())),
        }
    }
}

/// Single-assignment outcome cell.
#[derive(Debug)]
pub(crate) struct Settlement<T> {
    tx: watch::Sender<State<T>>,
}

impl<T: Clone> Settlement<T> {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(State::Pending);
        Self { tx }
    }

    /// Creates an already-settled cell.
    pub(crate) fn settled(outcome: Result<T, TaskError>) -> Self {
        let cell = Self::new();
        cell.settle(outcome);
        cell
    }

    /// Settles the cell; returns `true` if this call won.
    pub(crate) fn settle(&self, outcome: Result<T, TaskError>) -> bool {
        self.tx.send_if_modified(move |state| {
            if !state.is_pending() {
                return false;
            }
            *state = match outcome {
                Ok(v) => State::Success(v),
                Err(e) => State::Failed(e),
            };
            true
        })
    }

    pub(crate) fn is_settled(&self) -> bool {
        !self.tx.borrow().is_pending()
    }

    /// Waits until the cell is settled and returns a copy of the outcome.
    pub(crate) async fn wait(&self) -> Result<T, TaskError> {
        let mut rx = self.tx.subscribe();
        let outcome = match rx.wait_for(|state| !state.is_pending()).await {
            Ok(state) => state.to_result(),
            Err(_closed) => None,
        };
        // The sender lives in `self`, so the channel cannot close while we wait.
        outcome.unwrap_or(Err(TaskError::Canceled))
    }
}
