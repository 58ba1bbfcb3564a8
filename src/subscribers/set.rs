//! # SubscriberSet: non-blocking fan-out over multiple subscribers.
//!
//! Distributes each [`Event`] to every subscriber without awaiting their
//! processing: one bounded queue and one worker task per subscriber.
//!
//! ## Guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - A panicking subscriber is caught and logged; its worker keeps running.
//!
//! ## Non-guarantees
//! - No ordering across different subscribers.
//! - No retry on queue overflow; the event is dropped for that subscriber.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::Event;

use super::Subscribe;

struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    // Workers end on their own once the queues close; retained so the set
    // owns what it spawned.
    _workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                        log::error!("subscriber '{}' panicked: {panic:?}", sub.name());
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self {
            channels,
            _workers: workers,
        }
    }

    /// Fans one event out to all subscribers without blocking.
    ///
    /// If a subscriber's queue is full or its worker is gone, the event is
    /// dropped for that subscriber and a warning is logged.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("subscriber '{}' dropped event: queue full", channel.name);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::warn!("subscriber '{}' dropped event: worker closed", channel.name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Recorder {
        seen: tokio::sync::mpsc::UnboundedSender<EventKind>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            let _ = self.seen.send(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct PanicsOnce {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Subscribe for PanicsOnce {
        async fn on_event(&self, _event: &Event) {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first event");
            }
        }

        fn name(&self) -> &'static str {
            "panics-once"
        }
    }

    #[tokio::test]
    async fn events_arrive_in_emit_order() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let set = SubscriberSet::new(vec![Arc::new(Recorder { seen: tx })]);

        set.emit(&Event::new(EventKind::ServeStarting));
        set.emit(&Event::new(EventKind::ServeFaulted));
        set.emit(&Event::new(EventKind::BackoffScheduled));

        assert_eq!(rx.recv().await, Some(EventKind::ServeStarting));
        assert_eq!(rx.recv().await, Some(EventKind::ServeFaulted));
        assert_eq!(rx.recv().await, Some(EventKind::BackoffScheduled));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_subscriber_keeps_its_worker() {
        let calls = Arc::new(AtomicUsize::new(0));
        let set = SubscriberSet::new(vec![Arc::new(PanicsOnce {
            calls: calls.clone(),
        })]);

        set.emit(&Event::new(EventKind::ServeStarting));
        set.emit(&Event::new(EventKind::ServeStopped));

        while calls.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}
