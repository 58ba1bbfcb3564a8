//! # Global runtime configuration.
//!
//! [`Config`] centralizes the settings of the supervision runtime. Reading
//! these values from a file or the environment is the hosting process's
//! concern; the crate only consumes the finished struct.
//!
//! ## Field semantics
//! - `port`: UDP/TCP port handed to the resolution service's listen call
//! - `store_path`: location of the serialized record set ("masterfile");
//!   absence of the file is a valid fresh-install state
//! - `retry_delay`: the fixed pause between a fault and the next serve
//!   attempt; deliberately constant, not exponential
//! - `refresh_interval`: period of the whitelist refresh loop
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped)

use std::path::PathBuf;
use std::time::Duration;

/// Settings for the supervision runtime.
///
/// All fields are public; prefer the accessors where a sentinel needs
/// clamping.
#[derive(Clone, Debug)]
pub struct Config {
    /// Port the resolution service listens on.
    pub port: u16,

    /// Path of the persisted record set.
    ///
    /// Read at most once per process lifetime, before the first serve
    /// attempt. A missing file is expected on fresh installs.
    pub store_path: PathBuf,

    /// Fixed delay between a fault and the next serve attempt.
    ///
    /// One constant interval by design: faults are rare infrastructure
    /// hiccups, and availability matters more than congestion avoidance.
    pub retry_delay: Duration,

    /// Interval of the periodic whitelist refresh.
    pub refresh_interval: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// observe `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `port = 53`
    /// - `store_path = "masterfile.json"` (relative to the working directory)
    /// - `retry_delay = 10s`
    /// - `refresh_interval = 5min`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            port: 53,
            store_path: PathBuf::from("masterfile.json"),
            retry_delay: Duration::from_secs(10),
            refresh_interval: Duration::from_secs(300),
            bus_capacity: 1024,
        }
    }
}
