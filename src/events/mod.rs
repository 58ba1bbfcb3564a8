//! Supervision events: typed lifecycle notifications and the broadcast bus.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
