//! # Example: upload_queue
//!
//! Simulates a batch of file uploads through a queue limited to two at a time.
//!
//! Shows how to:
//! - Submit identified work with progress reporting
//! - Cancel one upload while it waits and another while it transfers
//! - Follow the queue through [`TaskQueue::observe`]
//! - Shut down with a grace period
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► submit photo-1 .. photo-5   (2 running, 3 pending)
//!   ├─► cancel photo-5              (pending → cancelled, never runs)
//!   ├─► wait for photo-2 ≥ 40%
//!   ├─► cancel photo-2              (running → cancelled, slot freed)
//!   ├─► photo-4 fails at 60%        (others unaffected)
//!   └─► wait until idle, print final snapshot, shutdown
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example upload_queue --features logging
//! ```

use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use taskqueue::{
    LogWriter, QueueConfig, Retention, Subscribe, TaskContext, TaskError, TaskQueue, TaskStatus,
    WorkFn, WorkRef,
};
use tracing_subscriber::EnvFilter;

/// Fake upload: ten chunks, one every `chunk_delay`. Fails at `fail_at` percent if set.
fn upload(chunk_delay: Duration, fail_at: Option<u8>) -> WorkRef {
    WorkFn::arc(move |ctx: TaskContext| async move {
        for chunk in 1..=10u8 {
            tokio::select! {
                _ = ctx.cancelled() => return Err(TaskError::Canceled),
                _ = tokio::time::sleep(chunk_delay) => {}
            }
            let percent = chunk * 10;
            if fail_at == Some(percent) {
                return Err(TaskError::fail(format!("connection reset at chunk {chunk}")));
            }
            ctx.progress(percent);
        }
        Ok(())
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Configure: two concurrent uploads, keep results until cleared
    let mut cfg = QueueConfig::new(2);
    cfg.grace = Duration::from_secs(5);
    cfg.retention = Retention::UntilCleared;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let queue = TaskQueue::builder(cfg).with_subscribers(subs).build()?;

    // 2. Print every snapshot as it arrives
    let mut updates = queue.observe();
    let printer = tokio::spawn(async move {
        while let Some(s) = updates.next().await {
            let line: Vec<String> = s
                .iter()
                .map(|r| format!("{}={}({}%)", r.id, r.status, r.progress))
                .collect();
            println!("[observer] v{} {}", s.version(), line.join(" "));
        }
    });

    // 3. Submit five uploads
    for i in 1..=5 {
        let fail_at = (i == 4).then_some(60);
        queue.submit(format!("photo-{i}"), upload(Duration::from_millis(80), fail_at))?;
    }
    println!("[main] running={} pending={}", queue.running(), queue.pending());

    // 4. Cancel one that has not started
    queue.cancel("photo-5");

    // 5. Cancel one mid-transfer
    queue
        .wait_until(|s| s.get("photo-2").is_some_and(|r| r.progress >= 40))
        .await;
    queue.cancel("photo-2");

    // 6. Wait for the rest
    let done = queue
        .wait_idle()
        .await
        .ok_or_else(|| anyhow::anyhow!("queue stopped unexpectedly"))?;
    println!("\n[main] final:");
    for r in done.iter() {
        match r.status {
            TaskStatus::Failed => println!(
                "  {} failed at {}%: {}",
                r.id,
                r.progress,
                r.reason.as_deref().unwrap_or("-")
            ),
            _ => println!("  {} {}", r.id, r.status),
        }
    }

    queue.shutdown().await?;
    drop(queue);
    printer.await?;
    Ok(())
}
