//! Wall-clock seam for the driver loop.
//!
//! Injecting the clock keeps the loop testable: a test double advances
//! simulated time on every sleep instead of blocking.

use std::time::Duration;

use chrono::{DateTime, Local};

/// Source of wall-clock time and bounded suspension.
pub trait WallClock {
    /// The current local wall-clock instant.
    fn now(&mut self) -> DateTime<Local>;

    /// Suspend the calling thread for roughly `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// The real clock: `Local::now` plus `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&mut self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
