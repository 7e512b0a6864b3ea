//! Wall-clock abstraction for the failure detector.
//!
//! Staleness decisions compare millisecond timestamps recorded at merge
//! time against the current clock. Production nodes read the system wall
//! clock; simulations and tests drive a manually advanced clock so that
//! suspect/dead transitions can be exercised deterministically.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of local wall-clock time in milliseconds.
///
/// Every timestamp stored in a membership table comes from the observing
/// node's own clock. Remote timestamps are never trusted (clock skew would
/// otherwise produce false suspicion).
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // Unix epoch millis; negative values (pre-1970 clocks) clamp to 0
        // and will be caught by the tick regression check.
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Manually advanced clock for deterministic simulations.
///
/// Shared between every node of a simulated cluster so that staleness
/// windows line up exactly with the scripted timeline.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_millis: AtomicU64,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now_millis: AtomicU64::new(start_millis),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.now_millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set the clock to an absolute value. Setting it backwards is allowed
    /// here; the tick path is responsible for rejecting regressions.
    pub fn set(&self, millis: u64) {
        self.now_millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now_millis.load(Ordering::SeqCst)
    }
}
