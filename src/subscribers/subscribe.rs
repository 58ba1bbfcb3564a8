//! # Subscriber trait.
//!
//! `Subscribe` is the extension point for plugging event handlers into the
//! runtime: log sinks, metrics, alerting. Each subscriber is driven by a
//! dedicated worker loop fed from a bounded queue owned by the
//! [`SubscriberSet`](crate::subscribers::SubscriberSet), so a slow handler
//! never blocks the supervision loops.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations may be
/// slow (I/O, batching) without affecting the publisher; on queue overflow,
/// events for that subscriber are dropped with a warning.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for overflow and panic diagnostics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        256
    }
}
