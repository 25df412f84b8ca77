//! Timestamps and the clock abstraction.
//!
//! A `Timestamp` is an opaque monotonic ordinal. Deployments may feed it
//! Unix seconds or block heights; the governance core only compares
//! timestamps and adds durations expressed in the same unit. Mixing units
//! (e.g. a block-count period added to a wall-clock time) is a configuration
//! error the core cannot detect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A point on the governance time line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `duration` units, or `None` on overflow.
    pub fn checked_add(self, duration: u64) -> Option<Self> {
        self.0.checked_add(duration).map(Self)
    }

    /// Units elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Source of the current time.
///
/// Implementations must be monotonic non-decreasing. The engine reads the
/// clock once per operation.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall-clock time in Unix seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // A clock set before 1970 reads as the epoch rather than panicking.
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Timestamp::new(secs)
    }
}
