//! Caller-supplied logical timestamps.
//!
//! The CRDTs only ever compare timestamps; they never generate them. Callers
//! that need causal ordering must hand in values that already encode it
//! (a Lamport counter, a hybrid clock, or plain wall-clock time).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A totally ordered logical timestamp.
///
/// Backed by an `i64` so that wall-clock nanoseconds, Lamport counters and
/// small hand-picked values in tests all fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Timestamp the sentinel root node is inserted with.
    ///
    /// Every replica must use the same value, so it is fixed here.
    pub const MIN_ROOT: Self = Self(1);

    /// Creates a timestamp from a raw value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the current wall-clock time in nanoseconds since the Unix epoch.
    ///
    /// Falls back to zero if the system clock is set before the epoch, and
    /// saturates at `i64::MAX`.
    #[must_use]
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or(0);

        Self(i64::try_from(nanos).unwrap_or(i64::MAX))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns a timestamp shifted by `delta`, saturating at the bounds.
    #[must_use]
    pub const fn offset(&self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
