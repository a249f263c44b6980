//! # Graceful shutdown context driven by OS signals.
//!
//! [`with_graceful_shutdown`] derives a [`Context`] that is cancelled when the process receives a
//! termination signal. [`with_graceful_shutdown_timeout`] additionally starts a grace timer at
//! that moment and force-cancels when it expires.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//!
//! **Other platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! ## State machine
//! ```text
//!            signal                    grace elapsed
//!   Armed ───────────► Signaled ─────────────────────► Expired
//!     │                   │
//!     │ handle.cancel()   │ handle.cancel()
//!     ▼                   ▼
//!   Retired            Retired
//! ```
//!
//! ## Rules
//! - Signal listeners are registered **when the context is created**, one set per instance.
//! - Only the first signal matters; a second one during the grace period changes nothing.
//! - Retiring the handle stops this instance's listener task and drops its signal streams.
//!   Tokio keeps its process-wide SIGINT/SIGTERM handler installed once registered, so the
//!   default disposition (terminate) is not restored; later signals with no listener are ignored.
//! - Expiry re-cancels the context (idempotent) and resolves [`ShutdownHandle::forced`].

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::context::{CancelHandle, Context};

/// Default grace period between a shutdown signal and forced cancellation.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Observable state of a graceful-shutdown context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownState {
    /// Listening for signals; context is live.
    Armed,
    /// Signal received; context cancelled, grace timer (if any) running.
    Signaled,
    /// Grace period elapsed before the owner retired the handle.
    Expired,
    /// Owner cancelled the context.
    Retired,
}

/// Owner side of a graceful-shutdown context.
///
/// Cloning is allowed; all clones control the same listener.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    cancel: CancelHandle,
    signaled: CancellationToken,
    retired: CancellationToken,
    forced: CancellationToken,
}

impl ShutdownHandle {
    fn new(cancel: CancelHandle) -> Self {
        Self {
            cancel,
            signaled: CancellationToken::new(),
            retired: CancellationToken::new(),
            forced: CancellationToken::new(),
        }
    }

    /// Retires the context: cancels it, stops the grace timer and ends the listener task.
    pub fn cancel(&self) {
        if !self.forced.is_cancelled() {
            self.retired.cancel();
        }
        self.cancel.cancel();
    }

    /// Current state.
    pub fn state(&self) -> ShutdownState {
        if self.forced.is_cancelled() {
            ShutdownState::Expired
        } else if self.retired.is_cancelled() {
            ShutdownState::Retired
        } else if self.signaled.is_cancelled() {
            ShutdownState::Signaled
        } else {
            ShutdownState::Armed
        }
    }

    /// Returns `true` once a shutdown signal has been received.
    pub fn is_signaled(&self) -> bool {
        self.signaled.is_cancelled()
    }

    /// Returns `true` once the grace period expired.
    pub fn is_forced(&self) -> bool {
        self.forced.is_cancelled()
    }

    /// Completes when the grace period expires.
    ///
    /// Never completes for instances without a grace period or that were retired in time.
    pub async fn forced(&self) {
        self.forced.cancelled().await
    }
}

/// Derives a context that is cancelled on SIGINT/SIGTERM.
///
/// # Panics
/// Must be called from within a Tokio runtime.
pub fn with_graceful_shutdown(parent: &Context) -> (Context, ShutdownHandle) {
    arm(parent, None)
}

/// Derives a context that is cancelled on SIGINT/SIGTERM and force-cancelled if the owner has
/// not retired it within `grace` after the signal. A zero `grace` disables escalation.
///
/// # Panics
/// Must be called from within a Tokio runtime.
pub fn with_graceful_shutdown_timeout(
    parent: &Context,
    grace: Duration,
) -> (Context, ShutdownHandle) {
    arm(parent, Some(grace).filter(|g| !g.is_zero()))
}

fn arm(parent: &Context, grace: Option<Duration>) -> (Context, ShutdownHandle) {
    let (ctx, cancel) = parent.with_cancel();
    let handle = ShutdownHandle::new(cancel);

    match ShutdownSignal::register() {
        Ok(signal) => {
            tokio::spawn(listen(signal, ctx.clone(), handle.clone(), grace));
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to register shutdown signal listener");
        }
    }
    (ctx, handle)
}

async fn listen(
    mut signal: ShutdownSignal,
    ctx: Context,
    handle: ShutdownHandle,
    grace: Option<Duration>,
) {
    let name = tokio::select! {
        name = signal.recv() => name,
        _ = ctx.cancelled() => {
            tracing::debug!("shutdown listener retired");
            return;
        }
    };
    drop(signal);

    tracing::info!(signal = name, grace = ?grace, "shutdown signal received; cancelling context");
    handle.signaled.cancel();
    handle.cancel.cancel();

    let Some(grace) = grace else { return };
    tokio::select! {
        _ = tokio::time::sleep(grace) => {
            tracing::warn!(
                grace = ?grace,
                "graceful shutdown period expired; forcing cancellation"
            );
            handle.cancel.cancel();
            handle.forced.cancel();
        }
        _ = handle.retired.cancelled() => {
            tracing::debug!("graceful shutdown completed within grace period");
        }
    }
}

/// Registered termination signal streams.
#[cfg(unix)]
struct ShutdownSignal {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        "ctrl-c"
    }
}
