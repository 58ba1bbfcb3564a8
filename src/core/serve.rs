//! # The serve loop: keeps the resolution service running.
//!
//! [`ServeLoop`] drives the supervised service for the life of the process:
//! one-time initialization, at most one persisted-record load, then repeated
//! blocking listen calls with a fixed, cancellable back-off between faults.
//!
//! ## State machine
//! ```text
//! Init ──ok──► Load ──loaded/absent──► Listen ──cancelled──► Stopped
//!   │            │                       │
//!   │ err        │ parse/io err          │ fault
//!   ▼            ▼                       ▼
//!  Dead        Backoff ◄────────────── Backoff
//!                │  │
//!                │  └─ cancelled ─► Stopped
//!                └─ slept ─► Load (short-circuits to Listen once loaded)
//! ```
//!
//! ## Rules
//! - `initialize()` runs exactly once; a restart never repeats it.
//! - The disk is read at most once per process lifetime *with a definitive
//!   outcome*: loaded or absent. A failed read leaves the loaded flag unset,
//!   so a repaired file is picked up on the restart after the back-off.
//! - Cancellation wins everywhere: observed during a listen call or during
//!   the back-off sleep, it ends the loop without another attempt.
//! - No fault escapes the loop; every one is published, logged by
//!   subscribers, and converted into a delayed retry.

use std::path::PathBuf;
use std::time::Duration;

use tokio::select;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::events::{Bus, Event, EventKind};
use crate::service::ServiceRef;
use crate::store::{self, LoadOutcome};

/// Explicit states of the serve loop.
///
/// Kept as an enum driven by a `loop { match … }` so the fault, cancel and
/// restart transitions stay auditable in one place.
enum ServeState {
    /// One-time service initialization.
    Init,
    /// At most one definitive read of the persisted record set.
    Load,
    /// The blocking listen call; the dominant suspension point.
    Listen,
    /// Fixed, cancellable pause before the next attempt.
    Backoff,
    /// Shutdown signal observed; terminal.
    Stopped,
    /// Initialization failed before the first attempt; terminal.
    Dead,
}

/// Supervises one resolution service: initialize, recover persisted
/// records, serve, and restart with back-off until shutdown.
pub(crate) struct ServeLoop {
    service: ServiceRef,
    bus: Bus,
    port: u16,
    store_path: PathBuf,
    retry_delay: Duration,
}

impl ServeLoop {
    /// Creates a serve loop for the given service.
    pub(crate) fn new(cfg: &Config, service: ServiceRef, bus: Bus) -> Self {
        Self {
            service,
            bus,
            port: cfg.port,
            store_path: cfg.store_path.clone(),
            retry_delay: cfg.retry_delay,
        }
    }

    /// Runs the loop until the shutdown signal fires or initialization
    /// fails.
    ///
    /// Intended for a dedicated task (`tokio::spawn`); it does not return
    /// during normal operation. Faults are retried indefinitely with the
    /// fixed delay: there is no retry cutoff, an external process monitor
    /// is the backstop for a persistently failing service.
    pub(crate) async fn run(self, ctx: CancellationToken) {
        let mut state = ServeState::Init;
        let mut has_loaded = false;
        let mut attempt: u64 = 0;

        loop {
            if ctx.is_cancelled() && !matches!(state, ServeState::Stopped | ServeState::Dead) {
                state = ServeState::Stopped;
            }

            state = match state {
                ServeState::Init => match self.service.initialize().await {
                    Ok(()) => ServeState::Load,
                    Err(e) => {
                        self.bus
                            .publish(Event::new(EventKind::ServeDead).with_reason(e.to_string()));
                        ServeState::Dead
                    }
                },

                ServeState::Load => {
                    if has_loaded {
                        ServeState::Listen
                    } else {
                        match store::load(&self.store_path) {
                            Ok(LoadOutcome::Loaded(set)) => {
                                has_loaded = true;
                                let count = set.len();
                                // The install must complete before the next
                                // listen call so no query races the swap.
                                self.service.install_records(set).await;
                                self.bus.publish(
                                    Event::new(EventKind::RecordsInstalled).with_count(count),
                                );
                                ServeState::Listen
                            }
                            Ok(LoadOutcome::NotFound) => {
                                has_loaded = true;
                                self.bus.publish(Event::new(EventKind::StoreAbsent));
                                ServeState::Listen
                            }
                            Err(e) => {
                                // Serving a partial or empty set here would
                                // silently answer wrong data; fault instead.
                                self.bus.publish(
                                    Event::new(EventKind::ServeFaulted)
                                        .with_reason(e.to_string()),
                                );
                                ServeState::Backoff
                            }
                        }
                    }
                }

                ServeState::Listen => {
                    attempt += 1;
                    self.bus
                        .publish(Event::new(EventKind::ServeStarting).with_attempt(attempt));
                    match self.service.listen(self.port, ctx.clone()).await {
                        // The listen contract blocks until cancelled or
                        // faulted, so a plain return means shutdown.
                        Ok(()) => ServeState::Stopped,
                        Err(e) if e.is_cancellation() || ctx.is_cancelled() => ServeState::Stopped,
                        Err(e) => {
                            self.bus.publish(
                                Event::new(EventKind::ServeFaulted)
                                    .with_attempt(attempt)
                                    .with_reason(e.to_string()),
                            );
                            ServeState::Backoff
                        }
                    }
                }

                ServeState::Backoff => {
                    let mut ev =
                        Event::new(EventKind::BackoffScheduled).with_delay(self.retry_delay);
                    if attempt > 0 {
                        ev = ev.with_attempt(attempt);
                    }
                    self.bus.publish(ev);

                    select! {
                        _ = time::sleep(self.retry_delay) => ServeState::Load,
                        _ = ctx.cancelled() => ServeState::Stopped,
                    }
                }

                ServeState::Stopped => {
                    self.bus.publish(Event::new(EventKind::ServeStopped));
                    break;
                }

                ServeState::Dead => break,
            };
        }
    }
}
