//! # Collaborator contracts consumed by the supervision runtime.
//!
//! The crate supervises a resolution service and a whitelist it does not
//! implement. Both are consumed through async traits and shared as
//! `Arc<dyn …>` handles ([`ServiceRef`], [`WhitelistRef`]).
//!
//! Implementations receive the shared [`CancellationToken`] and must honor
//! it cooperatively: once the signal fires, every blocking call is expected
//! to return promptly.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ServeError;
use crate::store::RecordSet;

/// Shared handle to a resolution service.
pub type ServiceRef = std::sync::Arc<dyn NameService>;

/// Shared handle to a whitelist collaborator.
pub type WhitelistRef = std::sync::Arc<dyn Whitelist>;

/// # The supervised resolution service.
///
/// The supervisor drives this contract in a fixed order: [`initialize`]
/// exactly once, then at most one [`install_records`], then [`listen`]
/// repeatedly across restarts.
///
/// [`initialize`]: NameService::initialize
/// [`install_records`]: NameService::install_records
/// [`listen`]: NameService::listen
#[async_trait]
pub trait NameService: Send + Sync + 'static {
    /// One-time setup before the first serve attempt.
    ///
    /// Never invoked again, not even after a fault; an error here is an
    /// unrecoverable startup condition.
    async fn initialize(&self) -> Result<(), ServeError>;

    /// Accepts and answers queries until cancelled or faulted.
    ///
    /// Blocks for the life of the serve attempt. Returns `Ok(())` (or
    /// [`ServeError::Canceled`]) once `ctx` fires; any other error is a
    /// fault the supervisor retries after the fixed delay.
    async fn listen(&self, port: u16, ctx: CancellationToken) -> Result<(), ServeError>;

    /// Replaces the record set answered to clients.
    ///
    /// The swap must be atomic: no reader may observe a partial set. The
    /// supervisor always awaits completion before the next listen call.
    async fn install_records(&self, records: RecordSet);
}

/// # The periodically refreshed whitelist.
///
/// Driven by the refresh ticker on a fixed interval, independent of the
/// serve loop. `refresh` must be safe to call repeatedly; a failed refresh
/// is logged and the next tick proceeds normally.
#[async_trait]
pub trait Whitelist: Send + Sync + 'static {
    /// Recomputes the whitelist from its upstream sources.
    async fn refresh(&self, ctx: CancellationToken) -> Result<(), ServeError>;
}
