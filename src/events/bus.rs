//! # Broadcast bus for supervision events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The serve
//! loop, the refresh ticker and the lifecycle controller publish into it;
//! the controller's listener forwards to the subscriber fan-out.
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receivers the event
//!   is dropped.
//! - Capacity is a single ring buffer shared by all receivers; a receiver
//!   that lags more than `capacity` events observes `RecvError::Lagged(n)`
//!   and skips the `n` oldest items.
//! - Events are not persisted anywhere.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for supervision events.
///
/// Cheap to clone (the sender is `Arc`-backed internally); every loop in
/// the runtime holds its own clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given ring buffer capacity (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver observing subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receivers_observe_published_events() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::ServeStarting).with_attempt(1));
        bus.publish(Event::new(EventKind::ServeStopped));

        assert_eq!(rx.recv().await.unwrap().kind, EventKind::ServeStarting);
        assert_eq!(rx.recv().await.unwrap().kind, EventKind::ServeStopped);
    }

    #[tokio::test]
    async fn publish_without_receivers_is_a_no_op() {
        let bus = Bus::new(16);
        bus.publish(Event::new(EventKind::ServeStopped));
    }
}
