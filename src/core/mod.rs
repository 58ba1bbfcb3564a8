//! Runtime core: the supervision loops and their lifecycle.
//!
//! Internal modules:
//! - [`serve`]: the serve/restart state machine around the resolution
//!   service;
//! - [`ticker`]: the periodic whitelist-refresh loop and its release-once
//!   handle;
//! - [`controller`]: spawns both loops and owns their handles;
//! - [`shutdown`]: OS signal to shutdown-token bridge.

mod controller;
mod serve;
mod ticker;

pub mod shutdown;

pub use controller::Controller;
pub use ticker::{Ticker, TickerHandle};
