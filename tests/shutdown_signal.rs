//! Delivers real SIGINT/SIGTERM to the test process.
//!
//! Signals are process-wide, so every scenario runs in sequence inside a single test of its
//! own binary; no other test observes the signals and no two scenarios overlap.
#![cfg(unix)]

use std::time::Duration;

use launchkit::{
    Context, Launcher, Logger, ShutdownState, TaskError, TaskFn, TaskRef,
    with_graceful_shutdown_timeout,
};
use tokio::time::{Instant, sleep, timeout};

const WITHIN: Duration = Duration::from_secs(5);

fn send(signal: &str) {
    let status = std::process::Command::new("kill")
        .args([signal, &std::process::id().to_string()])
        .status()
        .expect("run kill");
    assert!(status.success(), "kill {signal} failed");
}

#[tokio::test]
async fn signal_scenarios() {
    grace_expires_after_signal().await;
    retire_during_grace_stops_escalation().await;
    second_signal_changes_nothing().await;
    launcher_run_is_cancelled_by_signal().await;
}

async fn grace_expires_after_signal() {
    let (ctx, handle) =
        with_graceful_shutdown_timeout(&Context::background(), Duration::from_millis(50));
    assert_eq!(handle.state(), ShutdownState::Armed);

    send("-TERM");

    timeout(WITHIN, ctx.cancelled())
        .await
        .expect("context cancelled by signal");
    assert_eq!(ctx.cause(), Some(TaskError::Canceled));
    assert!(handle.is_signaled());

    timeout(WITHIN, handle.forced())
        .await
        .expect("grace period expires");
    assert_eq!(handle.state(), ShutdownState::Expired);

    // Retiring after expiry keeps the expired state.
    handle.cancel();
    assert_eq!(handle.state(), ShutdownState::Expired);
}

async fn retire_during_grace_stops_escalation() {
    let (ctx, handle) =
        with_graceful_shutdown_timeout(&Context::background(), Duration::from_millis(100));

    send("-INT");

    timeout(WITHIN, ctx.cancelled())
        .await
        .expect("context cancelled by signal");
    assert_eq!(handle.state(), ShutdownState::Signaled);

    handle.cancel();
    assert_eq!(handle.state(), ShutdownState::Retired);

    let forced = timeout(Duration::from_millis(300), handle.forced()).await;
    assert!(forced.is_err(), "grace timer kept running after retire");
    assert!(!handle.is_forced());
    assert_eq!(handle.state(), ShutdownState::Retired);
}

async fn second_signal_changes_nothing() {
    let grace = Duration::from_millis(200);
    let (ctx, handle) = with_graceful_shutdown_timeout(&Context::background(), grace);

    send("-TERM");
    timeout(WITHIN, ctx.cancelled())
        .await
        .expect("context cancelled by signal");
    let signaled_at = Instant::now();

    send("-INT");
    sleep(Duration::from_millis(50)).await;
    assert_eq!(handle.state(), ShutdownState::Signaled);
    assert_eq!(ctx.cause(), Some(TaskError::Canceled));

    timeout(WITHIN, handle.forced())
        .await
        .expect("grace period expires");
    // The timer started with the first signal and was not restarted or cut short by the second.
    assert!(signaled_at.elapsed() >= Duration::from_millis(150));
    assert_eq!(handle.state(), ShutdownState::Expired);

    handle.cancel();
}

async fn launcher_run_is_cancelled_by_signal() {
    let task: TaskRef = TaskFn::arc("service", |ctx: Context| async move {
        ctx.cancelled().await;
        Err::<(), _>(ctx.cause().unwrap_or(TaskError::Canceled))
    });

    // Shutdown before and after the timeout arms listeners on both contexts.
    let launcher = Launcher::new()
        .with_graceful_shutdown_timeout(Duration::from_secs(1))
        .with_timeout(Duration::from_secs(30))
        .with_graceful_shutdown();

    tokio::spawn(async {
        sleep(Duration::from_millis(50)).await;
        send("-TERM");
    });

    let outcome = timeout(WITHIN, launcher.run_one(task))
        .await
        .expect("run ends on signal");
    assert_eq!(outcome.error(), Some(&TaskError::Canceled));
    assert!(!outcome.log_if_error(Some(&Logger::new()), "service stopped"));
}
