//! # Example: Graceful Shutdown
//!
//! A worker runs until SIGINT/SIGTERM (Ctrl-C). The signal cancels the shutdown context the
//! worker watches, and the worker gets a short grace period to flush. A slow flush is abandoned
//! when the grace expires.
//!
//! ```text
//! Ctrl-C ─► ctx cancelled (Canceled) ─► worker flushes
//!                                 └─► 2s later: forced
//! ```
//!
//! Run with: `cargo run --example graceful_shutdown --features logging`
//! Set `SLOW_FLUSH=1` to watch the escalation.

use std::time::Duration;

use launchkit::{
    Context, LogFormat, Logger, TaskError, TaskFn, TaskFuture, TaskRef, init_logging,
    with_graceful_shutdown_timeout,
};

fn worker(stop: Context, flush: Duration) -> TaskRef {
    TaskFn::arc("worker", move |ctx: Context| {
        let stop = stop.clone();
        async move {
            let (log, _guard) = ctx.require_logger()?.start_service("worker");
            let mut batches = 0u64;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_millis(500)) => {
                        batches += 1;
                        log.with_field("batch", batches).info("processed");
                    }
                }
            }

            log.with_field("flush", format!("{flush:?}"))
                .info("flushing");
            tokio::time::sleep(flush).await;
            Ok::<(), TaskError>(())
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::Pretty)?;

    let flush = if std::env::var_os("SLOW_FLUSH").is_some() {
        Duration::from_secs(10)
    } else {
        Duration::from_millis(300)
    };

    let logger = Logger::new().with_service("shutdown-demo");
    let root = Context::background().with_logger(logger.clone());
    let (stop, shutdown) = with_graceful_shutdown_timeout(&root, Duration::from_secs(2));

    // The worker runs in `root` so its future outlives the signal and reports the flush result.
    let fut = TaskFuture::spawn(&root, worker(stop, flush));
    tokio::select! {
        res = fut.wait() => {
            logger.log_if_error(res.err().as_ref(), "worker stopped");
        }
        _ = shutdown.forced() => {
            logger.warn("grace period expired before the worker finished");
        }
    }

    println!("final state: {:?}", shutdown.state());
    shutdown.cancel();
    Ok(())
}
