//! # Built-in log-sink subscriber.
//!
//! [`LogWriter`] renders supervision events through the [`log`] facade, so
//! operators see the restart history with whatever logger the hosting
//! process installed. Severities follow the event's meaning: expected
//! terminations are informational, faults are errors, periodic-tick chatter
//! is trace.

use async_trait::async_trait;
use log::{error, info, trace};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Subscriber that forwards events to the `log` facade.
///
/// The crate never installs a logger itself; without one these calls are
/// no-ops.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::ServeStarting => {
                info!("serve attempt {} starting", e.attempt.unwrap_or(0));
            }
            EventKind::ServeStopped => {
                info!("shutdown signal observed; resolver supervision stopped");
            }
            EventKind::ServeFaulted => match e.attempt {
                Some(att) => error!(
                    "serve attempt {att} faulted: {}",
                    e.reason.as_deref().unwrap_or("unknown cause")
                ),
                None => error!(
                    "record load faulted: {}",
                    e.reason.as_deref().unwrap_or("unknown cause")
                ),
            },
            EventKind::ServeDead => {
                error!(
                    "service initialization failed, supervision ended: {}",
                    e.reason.as_deref().unwrap_or("unknown cause")
                );
            }
            EventKind::BackoffScheduled => {
                info!("retrying in {}ms", e.delay_ms.unwrap_or(0));
            }
            EventKind::RecordsInstalled => {
                info!("installed {} persisted records", e.count.unwrap_or(0));
            }
            EventKind::StoreAbsent => {
                info!("no persisted record set found; starting empty");
            }
            EventKind::RefreshTicked => {
                trace!("{} refresh completed", e.name.as_deref().unwrap_or("?"));
            }
            EventKind::RefreshFailed => {
                error!(
                    "{} refresh failed: {}",
                    e.name.as_deref().unwrap_or("?"),
                    e.reason.as_deref().unwrap_or("unknown cause")
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
