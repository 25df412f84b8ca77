//! Nullable clock: deterministic time for testing.

use ballot_types::{Clock, Timestamp};
use std::cell::Cell;

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial: u64) -> Self {
        Self {
            current: Cell::new(initial),
        }
    }

    /// Advance time by a number of units.
    pub fn advance(&self, units: u64) {
        self.current.set(self.current.get().saturating_add(units));
    }

    /// Set the time to a specific value.
    pub fn set(&self, ticks: u64) {
        self.current.set(ticks);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}
