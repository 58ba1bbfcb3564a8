//! # Lifecycle controller: wires and owns the long-running tasks.
//!
//! [`Controller`] is the crate's entry point for the hosting process.
//! `initialize()` spawns the serve loop and the whitelist refresh ticker,
//! both keyed off the host's shared [`CancellationToken`], plus the event
//! fan-out listener; `dispose()` idempotently releases the ticker handle.
//!
//! ```text
//! host ──► Controller::initialize(&token)
//!             ├─► spawn ServeLoop::run(token)        (serve/restart loop)
//!             ├─► Ticker::spawn("whitelist", …)      (refresh loop)
//!             └─► spawn listener: Bus ─► SubscriberSet::emit
//!
//! host ──► token.cancel()          (shutdown; both loops exit)
//! host ──► Controller::dispose()   (release ticker handle, once)
//! ```
//!
//! `dispose()` is a resource-release step, not a cancellation trigger: it
//! neither cancels nor joins the serve task. Shutdown travels through the
//! token, which the host owns and signals exactly once. The serve task is
//! joined implicitly by process exit after cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::Bus;
use crate::service::{ServiceRef, WhitelistRef};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::serve::ServeLoop;
use super::ticker::{Ticker, TickerHandle};

/// Handles retained for disposal bookkeeping.
///
/// Only the ticker handle is released deterministically; the others are
/// kept so the controller owns what it spawned.
struct Running {
    refresh: TickerHandle,
    _serve: JoinHandle<()>,
    _listener: JoinHandle<()>,
}

/// Owns the supervision runtime for one resolution service.
pub struct Controller {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    service: ServiceRef,
    whitelist: WhitelistRef,
    running: Mutex<Option<Running>>,
    disposed: AtomicBool,
}

impl Controller {
    /// Creates a controller around the given collaborators.
    ///
    /// Must be called from within a tokio runtime (subscriber workers are
    /// spawned here).
    pub fn new(
        cfg: Config,
        service: ServiceRef,
        whitelist: WhitelistRef,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Self {
            cfg,
            bus,
            subs,
            service,
            whitelist,
            running: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Starts the serve loop and the whitelist refresh loop.
    ///
    /// Callable exactly once per process lifetime; a second call is
    /// undefined and deliberately unguarded. The token is the host's
    /// process-wide shutdown signal, created once and shared by reference;
    /// this method never creates its own.
    pub fn initialize(&self, ctx: &CancellationToken) {
        let listener = self.subscriber_listener();

        let serve = ServeLoop::new(&self.cfg, self.service.clone(), self.bus.clone());
        let serve = tokio::spawn(serve.run(ctx.clone()));

        let whitelist = self.whitelist.clone();
        let refresh = Ticker::spawn(
            "whitelist",
            self.cfg.refresh_interval,
            ctx.clone(),
            self.bus.clone(),
            move |tick_ctx| {
                let whitelist = whitelist.clone();
                async move { whitelist.refresh(tick_ctx).await }
            },
        );

        if let Ok(mut slot) = self.running.lock() {
            *slot = Some(Running {
                refresh,
                _serve: serve,
                _listener: listener,
            });
        }
    }

    /// Releases the refresh ticker's resources.
    ///
    /// Idempotent: the release path sits behind a one-shot atomic gate, so
    /// a second call (from any thread) is a no-op. Never fails. Does not
    /// cancel or join the serve task; that is the token's job.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(slot) = self.running.lock() {
            if let Some(running) = slot.as_ref() {
                running.refresh.release();
            }
        }
    }

    /// Forwards bus events to the subscriber fan-out.
    ///
    /// Deliberately not keyed off the shutdown token: events raised while
    /// the loops wind down (the final stop notification in particular)
    /// still reach the sinks. The task ends when the bus closes, which
    /// happens when the controller is dropped.
    fn subscriber_listener(&self) -> JoinHandle<()> {
        use tokio::sync::broadcast::error::RecvError;

        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => subs.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServeError;
    use crate::events::{Event, EventKind};
    use crate::service::{NameService, Whitelist};
    use crate::store::RecordSet;

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time;

    /// Service that serves until cancelled and counts its calls.
    struct BlockingService {
        listen_calls: AtomicUsize,
    }

    #[async_trait]
    impl NameService for BlockingService {
        async fn initialize(&self) -> Result<(), ServeError> {
            Ok(())
        }

        async fn listen(&self, _port: u16, ctx: CancellationToken) -> Result<(), ServeError> {
            self.listen_calls.fetch_add(1, Ordering::SeqCst);
            ctx.cancelled().await;
            Ok(())
        }

        async fn install_records(&self, _records: RecordSet) {}
    }

    struct CountingWhitelist {
        refreshes: AtomicUsize,
    }

    #[async_trait]
    impl Whitelist for CountingWhitelist {
        async fn refresh(&self, _ctx: CancellationToken) -> Result<(), ServeError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Subscriber recording event kinds for assertions.
    struct Recorder {
        kinds: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.kinds.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn test_controller(
        dir: &tempfile::TempDir,
    ) -> (
        Controller,
        Arc<BlockingService>,
        Arc<CountingWhitelist>,
        Arc<Mutex<Vec<EventKind>>>,
    ) {
        let cfg = Config {
            port: 5353,
            store_path: dir.path().join("masterfile.json"),
            retry_delay: Duration::from_secs(10),
            refresh_interval: Duration::from_secs(60),
            ..Config::default()
        };
        let service = Arc::new(BlockingService {
            listen_calls: AtomicUsize::new(0),
        });
        let whitelist = Arc::new(CountingWhitelist {
            refreshes: AtomicUsize::new(0),
        });
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let controller = Controller::new(
            cfg,
            service.clone() as ServiceRef,
            whitelist.clone() as WhitelistRef,
            vec![Arc::new(Recorder {
                kinds: kinds.clone(),
            })],
        );
        (controller, service, whitelist, kinds)
    }

    async fn wait_for(cond: impl Fn() -> bool) {
        time::timeout(Duration::from_secs(600), async {
            while !cond() {
                time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    #[tokio::test(start_paused = true)]
    async fn initialize_starts_both_loops() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, service, whitelist, _kinds) = test_controller(&dir);
        let ctx = CancellationToken::new();

        controller.initialize(&ctx);

        wait_for(|| whitelist.refreshes.load(Ordering::SeqCst) >= 2).await;
        assert_eq!(service.listen_calls.load(Ordering::SeqCst), 1);

        ctx.cancel();
        controller.dispose();
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_is_idempotent_and_stops_the_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, _service, whitelist, _kinds) = test_controller(&dir);
        let ctx = CancellationToken::new();

        controller.initialize(&ctx);
        wait_for(|| whitelist.refreshes.load(Ordering::SeqCst) >= 1).await;

        controller.dispose();
        controller.dispose();

        let frozen = whitelist.refreshes.load(Ordering::SeqCst);
        time::sleep(Duration::from_secs(300)).await;
        assert_eq!(whitelist.refreshes.load(Ordering::SeqCst), frozen);

        ctx.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_does_not_cancel_the_serve_loop() {
        let dir = tempfile::tempdir().unwrap();
        let (controller, service, _whitelist, kinds) = test_controller(&dir);
        let ctx = CancellationToken::new();

        controller.initialize(&ctx);
        wait_for(|| service.listen_calls.load(Ordering::SeqCst) == 1).await;

        controller.dispose();
        time::sleep(Duration::from_secs(30)).await;

        // Still serving: only the token ends the serve loop, and once it
        // fires the stop event flows through the subscriber fan-out.
        assert!(!kinds.lock().unwrap().contains(&EventKind::ServeStopped));
        ctx.cancel();
        wait_for(|| kinds.lock().unwrap().contains(&EventKind::ServeStopped)).await;
        assert_eq!(service.listen_calls.load(Ordering::SeqCst), 1);
    }
}
