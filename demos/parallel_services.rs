//! # Example: Parallel Services
//!
//! Starts three services under one launcher with a shared logger and an overall timeout.
//! One service fails; the others keep running to completion and the first error is logged.
//!
//! ```text
//! Launcher ─► run_all([quotes, trades, audit])
//!               ├─ quotes: ticks until cancelled or done
//!               ├─ trades: fails after 300ms
//!               └─ audit : collects a value with ParallelResultFuture
//! ```
//!
//! Run with: `RUST_LOG=debug cargo run --example parallel_services --features logging`

use std::time::Duration;

use launchkit::{
    Context, LaunchConfig, Launcher, Logger, ParallelResultFuture, TaskError, TaskFn, TaskRef,
    init_logging,
};

fn ticker(name: &'static str, ticks: u32, every: Duration) -> TaskRef {
    TaskFn::arc(name, move |ctx: Context| async move {
        let (log, _guard) = ctx.require_logger()?.start_service(name);
        for tick in 1..=ticks {
            tokio::select! {
                _ = ctx.cancelled() => return Err(ctx.cause().unwrap_or(TaskError::Canceled)),
                _ = tokio::time::sleep(every) => log.with_field("tick", tick).info("tick"),
            }
        }
        Ok(())
    })
}

fn flaky(name: &'static str, after: Duration) -> TaskRef {
    TaskFn::arc(name, move |ctx: Context| async move {
        let (log, _guard) = ctx.require_logger()?.start_service(name);
        tokio::time::sleep(after).await;
        log.warn("upstream closed the stream");
        Err::<(), _>(TaskError::fail("upstream closed the stream"))
    })
}

fn audit() -> TaskRef {
    TaskFn::arc("audit", |ctx: Context| async move {
        let shards: Vec<TaskRef<u64>> = (1..=4u64)
            .map(|shard| -> TaskRef<u64> {
                TaskFn::arc("audit-shard", move |_ctx: Context| async move {
                    tokio::time::sleep(Duration::from_millis(50 * shard)).await;
                    Ok::<_, TaskError>(shard * 100)
                })
            })
            .collect();

        let counts = ParallelResultFuture::spawn_all(&ctx, shards).wait().await?;
        ctx.require_logger()?
            .with_field("records", counts.iter().sum::<u64>())
            .info("audit complete");
        Ok(())
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = LaunchConfig {
        timeout: Duration::from_secs(5),
        ..LaunchConfig::default()
    };
    init_logging(cfg.log_format)?;

    let logger = Logger::new().with_field("env", "demo");
    let outcome = Launcher::from_config(&cfg)
        .with_logger_context(logger.clone())
        .run_all([
            ticker("quotes", 5, Duration::from_millis(100)),
            flaky("trades", Duration::from_millis(300)),
            audit(),
        ])
        .await;

    if outcome.log_if_error(Some(&logger), "services stopped with an error") {
        println!("first error: {:?}", outcome.error());
    }
    Ok(())
}
