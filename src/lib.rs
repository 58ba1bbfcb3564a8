//! # resolvisor
//!
//! **Resolvisor** keeps a name-resolution service alive for the life of a
//! process. It owns the service's startup, persisted-record recovery,
//! fault recovery with a fixed back-off, and a concurrently running
//! periodic whitelist refresh, all coordinated against one cooperative
//! shutdown signal. The service itself (sockets, query answering) and the
//! whitelist computation stay outside; they are consumed through the
//! [`NameService`] and [`Whitelist`] traits.
//!
//! ## Architecture
//! ```text
//! host process
//!   │  creates CancellationToken (the one shutdown signal)
//!   ▼
//! Controller::initialize(&token)
//!   ├──► serve loop (dedicated task)
//!   │      Init ─► Load(once) ─► Listen ──fault──► Backoff(fixed) ─► Listen
//!   │                              │                   │
//!   │                              └── cancelled ──────┴──► Stopped
//!   │
//!   ├──► refresh ticker (dedicated task)
//!   │      sleep(interval) ─► whitelist.refresh() ─► repeat until cancelled
//!   │
//!   └──► bus listener ─► SubscriberSet ─► LogWriter / custom sinks
//!
//! host: token.cancel()  → both loops exit promptly
//! host: controller.dispose()  → ticker resources released (idempotent)
//! ```
//!
//! Faults never escape the loops: every listen-time error and every failed
//! record load is published, logged, and converted into a delayed retry.
//! There is no retry cutoff; an external process monitor is the backstop
//! for a service that never recovers.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//!
//! use resolvisor::{
//!     shutdown, Config, Controller, LogWriter, NameService, RecordSet, ServeError, Whitelist,
//! };
//!
//! struct Responder;
//!
//! #[async_trait]
//! impl NameService for Responder {
//!     async fn initialize(&self) -> Result<(), ServeError> {
//!         Ok(())
//!     }
//!
//!     async fn listen(&self, _port: u16, ctx: CancellationToken) -> Result<(), ServeError> {
//!         // Accept and answer queries here; return once `ctx` fires.
//!         ctx.cancelled().await;
//!         Ok(())
//!     }
//!
//!     async fn install_records(&self, _records: RecordSet) {}
//! }
//!
//! struct Allowed;
//!
//! #[async_trait]
//! impl Whitelist for Allowed {
//!     async fn refresh(&self, _ctx: CancellationToken) -> Result<(), ServeError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> std::io::Result<()> {
//!     let controller = Controller::new(
//!         Config::default(),
//!         Arc::new(Responder),
//!         Arc::new(Allowed),
//!         vec![Arc::new(LogWriter)],
//!     );
//!
//!     let token = CancellationToken::new();
//!     controller.initialize(&token);
//!
//!     shutdown::cancel_on_termination(token).await?;
//!     controller.dispose();
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod service;
mod subscribers;

pub mod store;

// ---- Public re-exports ----

pub use config::Config;
pub use core::shutdown;
pub use core::{Controller, Ticker, TickerHandle};
pub use error::{ServeError, StoreError};
pub use events::{Bus, Event, EventKind};
pub use service::{NameService, ServiceRef, Whitelist, WhitelistRef};
pub use store::RecordSet;
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
