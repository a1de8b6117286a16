//! # Global runtime configuration.
//!
//! Provides [`SupervisorConfig`], the centralized settings for the
//! supervision runtime. Per-job behavior (restart, uniqueness, log paths)
//! lives in [`JobSpec`](crate::jobs::JobSpec) instead.

use std::time::Duration;

/// Global configuration for the supervision runtime.
///
/// ## Field semantics
/// - `grace`: maximum wait for instances to report exit during shutdown
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Maximum time to wait, after signaling every tracked instance on
    /// shutdown, for their exits to be observed.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// skip older items.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `grace = 30s` (reasonable shutdown window)
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            bus_capacity: 1024,
        }
    }
}
