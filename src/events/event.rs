//! # Lifecycle events emitted by the supervision runtime.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (timestamp, attempt number, cause, delay). Every supervision decision
//! publishes exactly one event, so subscribers see the full restart history
//! of the process: which attempt faulted, why, and when the next one runs.
//!
//! ## Ordering
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore exact order when events are consumed
//! out of band.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervision events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Serve loop ===
    /// A serve attempt is starting.
    ///
    /// Sets: `attempt`.
    ServeStarting,

    /// The serve loop observed the shutdown signal and exited. Expected
    /// termination, logged informational.
    ServeStopped,

    /// A serve attempt (or the initial record load) faulted.
    ///
    /// Sets: `reason`; `attempt` when a listen call was involved.
    ServeFaulted,

    /// The service's one-time initialization failed before the first serve
    /// attempt. The serve loop ends; no retry.
    ///
    /// Sets: `reason`.
    ServeDead,

    /// A retry is scheduled after a fault.
    ///
    /// Sets: `delay_ms`, `attempt`.
    BackoffScheduled,

    // === Record store ===
    /// The persisted record set was installed into the service.
    ///
    /// Sets: `count`.
    RecordsInstalled,

    /// No persisted record set on disk; the service starts with whatever
    /// it answers by default.
    StoreAbsent,

    // === Refresh ticker ===
    /// A periodic refresh tick completed.
    ///
    /// Sets: `name`.
    RefreshTicked,

    /// A periodic refresh tick failed; the loop continues.
    ///
    /// Sets: `name`, `reason`.
    RefreshFailed,
}

/// Supervision event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - remaining fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the periodic job, for ticker events.
    pub name: Option<Arc<str>>,
    /// Human-readable cause (fault and failure events).
    pub reason: Option<Arc<str>>,
    /// Serve attempt count (starting from 1, monotonic per process).
    pub attempt: Option<u64>,
    /// Back-off delay before the next attempt, in milliseconds.
    pub delay_ms: Option<u64>,
    /// Number of records involved.
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            name: None,
            reason: None,
            attempt: None,
            delay_ms: None,
            count: None,
        }
    }

    /// Attaches a periodic job name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches a human-readable cause.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a serve attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a back-off delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u64::MAX)) as u64;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a record count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::ServeStarting);
        let b = Event::new(EventKind::ServeStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builder_attaches_metadata() {
        let ev = Event::new(EventKind::BackoffScheduled)
            .with_attempt(3)
            .with_delay(Duration::from_secs(10))
            .with_reason("bind failed");

        assert_eq!(ev.kind, EventKind::BackoffScheduled);
        assert_eq!(ev.attempt, Some(3));
        assert_eq!(ev.delay_ms, Some(10_000));
        assert_eq!(ev.reason.as_deref(), Some("bind failed"));
        assert!(ev.name.is_none());
        assert!(ev.count.is_none());
    }
}
