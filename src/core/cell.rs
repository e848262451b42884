//! # Managed service registration.
//!
//! A [`ServiceCell`] is what the runtime keeps per registered service: the
//! service object, its [`ServiceContext`], its metrics record, the
//! last-step timestamp, and the once-flags guarding `setup` and `cleanup`.
//! The cell is shared between the directory (for routing and lookup) and
//! exactly one worker (for driving); [`Scheduler::get`](crate::Scheduler::get)
//! hands it out as the read surface for one service.
//!
//! ## Rules
//! - `setup` and `cleanup` each run at most once per registration
//!   (once-flags, not conventions).
//! - The last-step timestamp is written only by the owning worker and is
//!   monotonic while the service is assigned.
//! - Stopping is irreversible; a stopped service is never stepped again.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};

use crate::metrics::{MetricsSnapshot, ServiceMetrics};
use crate::messages::Envelope;
use crate::services::{ServiceContext, ServiceRef};

/// One registered service together with its runtime state.
pub struct ServiceCell {
    /// The user service object.
    service: ServiceRef,
    /// Runtime capabilities handed to every callback.
    ctx: ServiceContext,
    /// Step counters, mutated only by the owning worker.
    metrics: ServiceMetrics,
    /// Monotonic timestamp of the last *initiated* step; 0 = never ran.
    last_step_nanos: AtomicU64,
    /// Set once the worker has invoked `setup`.
    setup_done: AtomicBool,
    /// Set once removal has claimed the `cleanup` call.
    cleanup_claimed: AtomicBool,
}

impl ServiceCell {
    pub(crate) fn new(service: ServiceRef, ctx: ServiceContext) -> Self {
        Self {
            service,
            ctx,
            metrics: ServiceMetrics::new(),
            last_step_nanos: AtomicU64::new(0),
            setup_done: AtomicBool::new(false),
            cleanup_claimed: AtomicBool::new(false),
        }
    }

    /// Returns the logical name.
    pub fn name(&self) -> &str {
        self.ctx.name()
    }

    /// Returns the effective period.
    pub fn period(&self) -> std::time::Duration {
        self.ctx.period()
    }

    /// Returns true until the service has been stopped.
    pub fn is_running(&self) -> bool {
        self.ctx.is_running()
    }

    /// Requests a cooperative stop. Irreversible.
    pub fn stop(&self) {
        self.ctx.stop();
    }

    /// Asks the service whether it is done and may be reaped.
    pub fn is_complete(&self) -> bool {
        self.service.is_complete(&self.ctx)
    }

    /// Takes a copy-out snapshot of the service's counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of messages currently queued in the inbox.
    pub fn inbox_len(&self) -> usize {
        self.ctx.inbox().len()
    }

    pub(crate) fn service(&self) -> &ServiceRef {
        &self.service
    }

    pub(crate) fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub(crate) fn offer(&self, envelope: Envelope) -> bool {
        self.ctx.inbox().offer(envelope)
    }

    pub(crate) fn record_step(&self, nanos: u64) {
        self.metrics.record_step(nanos);
    }

    pub(crate) fn record_error(&self) -> u32 {
        self.metrics.record_error()
    }

    pub(crate) fn last_step_nanos(&self) -> u64 {
        self.last_step_nanos.load(AtomicOrdering::Relaxed)
    }

    pub(crate) fn set_last_step_nanos(&self, nanos: u64) {
        self.last_step_nanos.store(nanos, AtomicOrdering::Relaxed);
    }

    pub(crate) fn setup_pending(&self) -> bool {
        !self.setup_done.load(AtomicOrdering::Acquire)
    }

    pub(crate) fn mark_setup_done(&self) {
        self.setup_done.store(true, AtomicOrdering::Release);
    }

    /// Claims the single `cleanup` invocation; returns false if another
    /// removal already claimed it.
    pub(crate) fn claim_cleanup(&self) -> bool {
        !self.cleanup_claimed.swap(true, AtomicOrdering::AcqRel)
    }
}
