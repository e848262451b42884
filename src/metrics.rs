//! # Per-registration step metrics.
//!
//! One [`ServiceMetrics`] record exists per registered service and is
//! mutated only by the owning worker; any thread may take a
//! [`MetricsSnapshot`] copy at any time. Counters are per-field relaxed
//! atomics; a step is one datum, not a synchronization point.
//!
//! `record_step` resets the consecutive-error streak; `record_error`
//! returns the new streak so the worker can compare it against the
//! quarantine threshold without a second read.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering as AtomicOrdering};

use serde::Serialize;

/// Sentinel meaning "no step recorded yet"; reported as 0 in snapshots.
const MIN_UNSET: u64 = u64::MAX;

/// Thread-safe step counters for one service registration.
#[derive(Debug)]
pub struct ServiceMetrics {
    /// Successful `work_step` invocations.
    step_count: AtomicU64,
    /// Sum of successful step durations, in nanoseconds.
    total_step_nanos: AtomicU64,
    /// Fastest successful step; `MIN_UNSET` until the first sample.
    min_step_nanos: AtomicU64,
    /// Slowest successful step.
    max_step_nanos: AtomicU64,
    /// Failed `work_step` invocations.
    error_count: AtomicU64,
    /// Failures since the last successful step.
    consecutive_errors: AtomicU32,
}

impl ServiceMetrics {
    /// Creates a zeroed record.
    pub fn new() -> Self {
        Self {
            step_count: AtomicU64::new(0),
            total_step_nanos: AtomicU64::new(0),
            min_step_nanos: AtomicU64::new(MIN_UNSET),
            max_step_nanos: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            consecutive_errors: AtomicU32::new(0),
        }
    }

    /// Records one successful step of the given duration and resets the
    /// consecutive-error streak.
    pub fn record_step(&self, nanos: u64) {
        self.step_count.fetch_add(1, AtomicOrdering::Relaxed);
        self.total_step_nanos.fetch_add(nanos, AtomicOrdering::Relaxed);
        self.min_step_nanos.fetch_min(nanos, AtomicOrdering::Relaxed);
        self.max_step_nanos.fetch_max(nanos, AtomicOrdering::Relaxed);
        self.consecutive_errors.store(0, AtomicOrdering::Relaxed);
    }

    /// Records one failed step and returns the new consecutive-error
    /// streak.
    pub fn record_error(&self) -> u32 {
        self.error_count.fetch_add(1, AtomicOrdering::Relaxed);
        self.consecutive_errors.fetch_add(1, AtomicOrdering::Relaxed) + 1
    }

    /// Clears every counter back to the freshly-constructed state.
    pub fn reset(&self) {
        self.step_count.store(0, AtomicOrdering::Relaxed);
        self.total_step_nanos.store(0, AtomicOrdering::Relaxed);
        self.min_step_nanos.store(MIN_UNSET, AtomicOrdering::Relaxed);
        self.max_step_nanos.store(0, AtomicOrdering::Relaxed);
        self.error_count.store(0, AtomicOrdering::Relaxed);
        self.consecutive_errors.store(0, AtomicOrdering::Relaxed);
    }

    /// Takes a copy-out snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let min = self.min_step_nanos.load(AtomicOrdering::Relaxed);
        MetricsSnapshot {
            step_count: self.step_count.load(AtomicOrdering::Relaxed),
            total_step_nanos: self.total_step_nanos.load(AtomicOrdering::Relaxed),
            min_step_nanos: if min == MIN_UNSET { 0 } else { min },
            max_step_nanos: self.max_step_nanos.load(AtomicOrdering::Relaxed),
            error_count: self.error_count.load(AtomicOrdering::Relaxed),
            consecutive_errors: self.consecutive_errors.load(AtomicOrdering::Relaxed),
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of a service's counters, exportable to external
/// collectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Successful `work_step` invocations.
    pub step_count: u64,
    /// Sum of successful step durations, in nanoseconds.
    pub total_step_nanos: u64,
    /// Fastest successful step, or 0 before the first sample.
    pub min_step_nanos: u64,
    /// Slowest successful step, or 0 before the first sample.
    pub max_step_nanos: u64,
    /// Failed `work_step` invocations.
    pub error_count: u64,
    /// Failures since the last successful step.
    pub consecutive_errors: u32,
}

impl MetricsSnapshot {
    /// Mean successful step duration in nanoseconds, or 0 without samples.
    pub fn average_step_nanos(&self) -> u64 {
        if self.step_count == 0 {
            0
        } else {
            self.total_step_nanos / self.step_count
        }
    }
}
