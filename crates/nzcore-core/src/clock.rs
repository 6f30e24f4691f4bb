//! Logical clock: a monotonic integer counter.
//!
//! Ordering decisions never consult the wall clock; this counter is the only
//! notion of time the chain trusts. Values live in `1..=MAX_LOGICAL_TIME`,
//! the largest integer a JSON number can carry exactly.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{Error, Result};

/// Inclusive upper bound: 2^53 − 1.
pub const MAX_LOGICAL_TIME: u64 = (1u64 << 53) - 1;

/// Serialization version for clock state.
pub const CLOCK_STATE_VERSION: &str = "1.0";

/// A monotonic logical clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalClock {
    current: u64,
    frozen: bool,
}

/// Wire form of a clock: `{"logical_clock": n, "version": "1.0"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockState {
    pub logical_clock: u64,
    pub version: String,
}

impl LogicalClock {
    /// Create a clock at `initial`, which must be in `1..=MAX_LOGICAL_TIME`.
    pub fn new(initial: u64) -> Result<Self> {
        if initial == 0 {
            return Err(Error::LogicalTimeViolation(
                "initial logical time must be at least 1".into(),
            ));
        }
        if initial > MAX_LOGICAL_TIME {
            return Err(Error::LogicalTimeViolation(format!(
                "initial logical time {initial} exceeds {MAX_LOGICAL_TIME}"
            )));
        }
        Ok(Self {
            current: initial,
            frozen: false,
        })
    }

    /// Advance by one and return the new value.
    pub fn tick(&mut self) -> Result<u64> {
        if self.frozen {
            return Err(Error::LogicalTimeViolation("clock is frozen".into()));
        }
        if self.current >= MAX_LOGICAL_TIME {
            return Err(Error::LogicalTimeViolation(format!(
                "clock overflow past {MAX_LOGICAL_TIME}"
            )));
        }
        self.current += 1;
        Ok(self.current)
    }

    /// Whether a tick would currently succeed.
    pub fn can_tick(&self) -> bool {
        !self.frozen && self.current < MAX_LOGICAL_TIME
    }

    /// Read the current value.
    pub fn current(&self) -> u64 {
        self.current
    }

    /// Jump forward to `value`, which must be strictly greater than the
    /// current value.
    pub fn sync(&mut self, value: u64) -> Result<()> {
        if value <= self.current {
            return Err(Error::LogicalTimeViolation(format!(
                "sync target {value} is not greater than current {}",
                self.current
            )));
        }
        if value > MAX_LOGICAL_TIME {
            return Err(Error::LogicalTimeViolation(format!(
                "sync target {value} exceeds {MAX_LOGICAL_TIME}"
            )));
        }
        self.current = value;
        Ok(())
    }

    /// Block ticking, for audits and tests.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Allow ticking again.
    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Whether the clock is frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Snapshot for serialization.
    pub fn to_state(&self) -> ClockState {
        ClockState {
            logical_clock: self.current,
            version: CLOCK_STATE_VERSION.to_string(),
        }
    }

    /// Restore from a serialized snapshot.
    pub fn from_state(state: &ClockState) -> Result<Self> {
        Self::new(state.logical_clock)
    }

    /// `next` must be strictly after `prev`.
    pub fn validate_order(prev: u64, next: u64) -> bool {
        next > prev
    }

    /// Total order on logical times.
    pub fn compare(a: u64, b: u64) -> Ordering {
        a.cmp(&b)
    }
}
