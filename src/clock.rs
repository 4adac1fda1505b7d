//! Timestamp sources injected into encode calls.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Timestamp;

/// Source of store timestamps.
///
/// Every encode samples the clock in call order: one read per put, one read
/// per emitted delete.
pub trait Clock: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now_ms(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> Timestamp {
        (**self).now_ms()
    }
}

/// Wall clock that never goes backwards.
#[derive(Debug, Default)]
pub struct SystemClock {
    high_water: AtomicU64,
}

impl SystemClock {
    /// Creates a wall clock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Timestamp {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let prev = self.high_water.fetch_max(wall, Ordering::AcqRel);
        prev.max(wall)
    }
}

/// Clock pinned to one timestamp. Counts reads.
#[derive(Debug, Default)]
pub struct FixedClock {
    ts: Timestamp,
    reads: AtomicUsize,
}

impl FixedClock {
    /// Clock that always returns `ts`.
    pub fn new(ts: Timestamp) -> Self {
        Self {
            ts,
            reads: AtomicUsize::new(0),
        }
    }

    /// Number of samples taken so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> Timestamp {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.ts
    }
}

/// Clock returning `start`, `start + step`, ... on successive reads.
#[derive(Debug)]
pub struct StepClock {
    next: AtomicU64,
    step: u64,
    reads: AtomicUsize,
}

impl StepClock {
    /// Clock starting at `start` and advancing by `step` per read.
    pub fn new(start: Timestamp, step: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
            step,
            reads: AtomicUsize::new(0),
        }
    }

    /// Number of samples taken so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl Clock for StepClock {
    fn now_ms(&self) -> Timestamp {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.next.fetch_add(self.step, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_clock_advances_per_read() {
        let clock = StepClock::new(100, 5);
        assert_eq!(clock.now_ms(), 100);
        assert_eq!(clock.now_ms(), 105);
        assert_eq!(clock.now_ms(), 110);
        assert_eq!(clock.reads(), 3);
    }

    #[test]
    fn fixed_clock_counts_reads() {
        let clock = FixedClock::new(42);
        assert_eq!((&clock).now_ms(), 42);
        assert_eq!(clock.now_ms(), 42);
        assert_eq!(clock.reads(), 2);
    }

    #[test]
    fn system_clock_is_non_decreasing() {
        let clock = SystemClock::new();
        let mut last = 0;
        for _ in 0..1000 {
            let now = clock.now_ms();
            assert!(now >= last);
            last = now;
        }
    }
}
