//! # Periodic ticker: runs a named job on a fixed interval.
//!
//! [`Ticker::spawn`] starts a background loop that sleeps the interval,
//! invokes the job once, and repeats until the shared shutdown signal
//! fires. Both the sleep and the job honor cancellation.
//!
//! A failed tick is published as [`EventKind::RefreshFailed`] and the loop
//! continues; one bad refresh must not kill future refreshes. The returned
//! [`TickerHandle`] releases the loop's resources exactly once.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::select;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::ServeError;
use crate::events::{Bus, Event, EventKind};

/// Handle to a running ticker loop.
///
/// Dropping the handle does not stop the loop; call
/// [`release`](TickerHandle::release). Releasing twice, or releasing after
/// the loop already ended, is a no-op.
pub struct TickerHandle {
    task: JoinHandle<()>,
    released: AtomicBool,
}

impl TickerHandle {
    /// Releases the loop's resources.
    ///
    /// One-shot gate: only the first call aborts the background task, and
    /// aborting a task that already finished does nothing. Never fails.
    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            self.task.abort();
        }
    }

    /// True once [`release`](TickerHandle::release) has been called.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Factory for periodic background jobs.
pub struct Ticker;

impl Ticker {
    /// Spawns a loop that runs `job` every `interval` until `ctx` fires.
    ///
    /// The job builds a fresh future per tick and receives the shared
    /// cancellation token so long-running refreshes can exit promptly on
    /// shutdown. Per tick exactly one event is published:
    /// [`EventKind::RefreshTicked`] or [`EventKind::RefreshFailed`]. A job
    /// returning [`ServeError::Canceled`] ends the loop like the token
    /// firing does.
    pub fn spawn<F, Fut>(
        name: &'static str,
        interval: Duration,
        ctx: CancellationToken,
        bus: Bus,
        job: F,
    ) -> TickerHandle
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServeError>> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            loop {
                select! {
                    _ = time::sleep(interval) => {}
                    _ = ctx.cancelled() => break,
                }

                match job(ctx.clone()).await {
                    Ok(()) => {
                        bus.publish(Event::new(EventKind::RefreshTicked).with_name(name));
                    }
                    Err(e) if e.is_cancellation() => break,
                    Err(e) => {
                        bus.publish(
                            Event::new(EventKind::RefreshFailed)
                                .with_name(name)
                                .with_reason(e.to_string()),
                        );
                    }
                }

                if ctx.is_cancelled() {
                    break;
                }
            }
        });

        TickerHandle {
            task,
            released: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counting_job(counter: Arc<AtomicUsize>) -> impl Fn(CancellationToken) -> TickFut {
        move |_ctx| {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }) as TickFut
        }
    }

    type TickFut = std::pin::Pin<Box<dyn Future<Output = Result<(), ServeError>> + Send>>;

    #[tokio::test(start_paused = true)]
    async fn ticks_at_interval_until_cancelled() {
        let bus = Bus::new(16);
        let ctx = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let _handle = Ticker::spawn(
            "whitelist",
            Duration::from_millis(100),
            ctx.clone(),
            bus,
            counting_job(count.clone()),
        );

        time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        ctx.cancel();
        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3, "no ticks after cancellation");
    }

    #[tokio::test(start_paused = true)]
    async fn release_stops_the_loop_and_is_idempotent() {
        let bus = Bus::new(16);
        let ctx = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let handle = Ticker::spawn(
            "whitelist",
            Duration::from_millis(100),
            ctx.clone(),
            bus,
            counting_job(count.clone()),
        );

        time::sleep(Duration::from_millis(150)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        handle.release();
        handle.release();
        assert!(handle.is_released());

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1, "no ticks after release");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_ticks_do_not_stop_the_loop() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let ctx = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let attempts = count.clone();
        let _handle = Ticker::spawn(
            "whitelist",
            Duration::from_millis(100),
            ctx.clone(),
            bus.clone(),
            move |_ctx| {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(ServeError::fault("upstream unreachable"))
                }
            },
        );

        time::sleep(Duration::from_millis(350)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::RefreshFailed);
        assert_eq!(ev.name.as_deref(), Some("whitelist"));
        assert_eq!(ev.reason.as_deref(), Some("service fault: upstream unreachable"));

        ctx.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn job_reporting_cancellation_ends_the_loop() {
        let bus = Bus::new(16);
        let ctx = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let attempts = count.clone();
        let _handle = Ticker::spawn(
            "whitelist",
            Duration::from_millis(100),
            ctx.clone(),
            bus,
            move |_ctx| {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(ServeError::Canceled)
                }
            },
        );

        time::sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_publishes_refresh_ticked() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let ctx = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let _handle = Ticker::spawn(
            "whitelist",
            Duration::from_millis(100),
            ctx.clone(),
            bus.clone(),
            counting_job(count.clone()),
        );

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::RefreshTicked);
        assert_eq!(ev.name.as_deref(), Some("whitelist"));

        ctx.cancel();
    }
}
