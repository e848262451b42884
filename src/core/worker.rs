//! # Worker: drives a set of services on a fixed tick.
//!
//! A [`Worker`] owns a subset of the registered services and runs them from
//! a single long-lived task. Each tick it snapshots its assignments, reads
//! the monotonic clock once, and steps every running service whose period
//! has elapsed, measuring the step and feeding the service's metrics.
//!
//! ## Tick loop
//! ```text
//! loop {
//!   ├─► check cancellation (fast-path)
//!   ├─► snapshot assigned services
//!   ├─► now = monotonic_nanos()        (one read per tick)
//!   ├─► for each service in snapshot:
//!   │     ├─► skip if stopped
//!   │     ├─► first contact → setup (once; failure stops the service)
//!   │     ├─► due iff never ran, or now - last_step ≥ period
//!   │     ├─► advance last_step *before* stepping
//!   │     └─► timed work_step:
//!   │           ├─► Ok  → record_step (resets error streak)
//!   │           └─► Err → record_error; fatal or streak ≥ threshold
//!   │                     → stop service, publish ServiceQuarantined
//!   └─► sleep(tick) (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - One worker task drives many services; no task is spawned per service,
//!   so a service's callbacks are totally ordered and never self-concurrent.
//! - A failed step still advances the schedule: it cannot be retried
//!   back-to-back within the same period.
//! - Effective minimum period of a service is `max(period, tick)`.
//! - Panics inside callbacks are caught and treated as fatal failures; no
//!   user error escapes the loop.
//! - Visit order within one tick follows the assignment list and is not
//!   observable externally.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::ServiceError;
use crate::events::{Bus, Event, EventKind};
use crate::metrics::MetricsSnapshot;

use super::cell::ServiceCell;
use super::clock;

/// Drives assigned services on a fixed tick, with auto-quarantine.
pub struct Worker {
    /// Index of this worker within the scheduler's pool.
    id: usize,
    /// Polling quantum in milliseconds.
    tick_ms: AtomicU64,
    /// Consecutive failures after which a service is stopped.
    error_threshold: AtomicU32,
    /// Set when the scheduler has spawned the tick loop.
    started: AtomicBool,
    /// Set when the tick loop has exited.
    exited: AtomicBool,
    /// Cooperative stop flag for the tick loop.
    token: CancellationToken,
    /// Services assigned to this worker; iterated via per-tick snapshots.
    services: Mutex<Vec<Arc<ServiceCell>>>,
    /// Diagnostics sink.
    bus: Bus,
}

impl Worker {
    pub(crate) fn new(id: usize, cfg: &Config, bus: Bus) -> Self {
        Self {
            id,
            tick_ms: AtomicU64::new(cfg.tick.as_millis().max(1) as u64),
            error_threshold: AtomicU32::new(cfg.error_threshold),
            started: AtomicBool::new(false),
            exited: AtomicBool::new(false),
            token: CancellationToken::new(),
            services: Mutex::new(Vec::new()),
            bus,
        }
    }

    /// Returns this worker's index within the pool.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the current tick period.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.load(AtomicOrdering::Relaxed))
    }

    /// Updates the tick period. A zero duration is rejected with a
    /// diagnostic and the previous value is kept.
    pub fn set_tick(&self, tick: Duration) {
        if tick.is_zero() {
            self.bus.publish(
                Event::now(EventKind::ConfigAdjusted)
                    .with_worker(self.id)
                    .with_error("tick_rejected_non_positive"),
            );
            return;
        }
        self.tick_ms
            .store(tick.as_millis().max(1) as u64, AtomicOrdering::Relaxed);
    }

    /// Returns the auto-quarantine threshold.
    pub fn error_threshold(&self) -> u32 {
        self.error_threshold.load(AtomicOrdering::Relaxed)
    }

    /// Updates the auto-quarantine threshold. Zero is rejected with a
    /// diagnostic and the previous value is kept.
    pub fn set_error_threshold(&self, threshold: u32) {
        if threshold == 0 {
            self.bus.publish(
                Event::now(EventKind::ConfigAdjusted)
                    .with_worker(self.id)
                    .with_error("error_threshold_rejected_non_positive"),
            );
            return;
        }
        self.error_threshold
            .store(threshold, AtomicOrdering::Relaxed);
    }

    /// Returns a stable copy of the currently assigned services.
    pub fn snapshot_services(&self) -> Vec<Arc<ServiceCell>> {
        self.services
            .lock()
            .expect("worker service list poisoned")
            .clone()
    }

    /// Returns a copy-out metrics view keyed by service name.
    pub fn snapshot_metrics(&self) -> HashMap<String, MetricsSnapshot> {
        self.snapshot_services()
            .into_iter()
            .map(|cell| (cell.name().to_string(), cell.metrics()))
            .collect()
    }

    /// Number of services currently assigned.
    pub fn len(&self) -> usize {
        self.services
            .lock()
            .expect("worker service list poisoned")
            .len()
    }

    /// True when no services are assigned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of the currently assigned services, in assignment order.
    pub fn service_names(&self) -> Vec<String> {
        self.snapshot_services()
            .iter()
            .map(|cell| cell.name().to_string())
            .collect()
    }

    /// Requests the tick loop to exit after the current tick.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// True once the tick loop has been spawned.
    pub fn is_started(&self) -> bool {
        self.started.load(AtomicOrdering::Acquire)
    }

    /// True once the tick loop has exited.
    pub fn has_exited(&self) -> bool {
        self.exited.load(AtomicOrdering::Acquire)
    }

    /// Marks the worker started; returns false if it already was.
    pub(crate) fn mark_started(&self) -> bool {
        !self.started.swap(true, AtomicOrdering::AcqRel)
    }

    /// Assigns a service. Picked up by the next tick.
    pub(crate) fn add_service(&self, cell: Arc<ServiceCell>) {
        self.services
            .lock()
            .expect("worker service list poisoned")
            .push(cell);
    }

    /// Removes the named service: drop from the assignment list, stop it,
    /// then run its one-time `cleanup`. Removing an unknown name is a
    /// no-op with a diagnostic. Returns true if a service was removed.
    pub(crate) async fn remove_service(&self, name: &str) -> bool {
        let cell = {
            let mut services = self.services.lock().expect("worker service list poisoned");
            match services.iter().position(|cell| cell.name() == name) {
                Some(index) => Some(services.remove(index)),
                None => None,
            }
        };
        let Some(cell) = cell else {
            self.bus.publish(
                Event::now(EventKind::ServiceNotFound)
                    .with_service(name)
                    .with_worker(self.id)
                    .with_error("remove_unassigned"),
            );
            return false;
        };

        cell.stop();
        if cell.claim_cleanup() {
            if let Err(e) = run_guarded(cell.service().cleanup(cell.context())).await {
                self.bus.publish(
                    Event::now(EventKind::ServiceCleanupFailed)
                        .with_service(name)
                        .with_worker(self.id)
                        .with_error(e.to_string()),
                );
            }
        }
        self.bus.publish(
            Event::now(EventKind::ServiceRemoved)
                .with_service(name)
                .with_worker(self.id),
        );
        true
    }

    /// Runs the tick loop until cancellation.
    pub(crate) async fn run(self: Arc<Self>) {
        self.bus
            .publish(Event::now(EventKind::WorkerStarted).with_worker(self.id));

        while !self.token.is_cancelled() {
            let snapshot = self.snapshot_services();
            // One clock read per tick: every due-check below uses the same
            // instant.
            let now = clock::monotonic_nanos();

            for cell in &snapshot {
                if !cell.is_running() {
                    continue;
                }
                if cell.setup_pending() {
                    self.run_setup(cell).await;
                    if !cell.is_running() {
                        continue;
                    }
                }

                let period_nanos = cell.period().as_nanos() as u64;
                let last = cell.last_step_nanos();
                let due = last == 0 || now.saturating_sub(last) >= period_nanos;
                if !due {
                    continue;
                }
                // Advance the schedule before stepping: a failing step must
                // not be retried within the same period.
                cell.set_last_step_nanos(now);
                self.run_step(cell).await;
            }

            let tick = self.tick();
            select! {
                _ = time::sleep(tick) => {}
                _ = self.token.cancelled() => {}
            }
        }

        self.exited.store(true, AtomicOrdering::Release);
        self.bus
            .publish(Event::now(EventKind::WorkerStopped).with_worker(self.id));
    }

    /// Invokes `setup` exactly once; a failure stops the service and leaves
    /// it in place for the next sweep.
    async fn run_setup(&self, cell: &Arc<ServiceCell>) {
        let result = run_guarded(cell.service().setup(cell.context())).await;
        cell.mark_setup_done();
        if let Err(e) = result {
            self.bus.publish(
                Event::now(EventKind::ServiceSetupFailed)
                    .with_service(cell.name())
                    .with_worker(self.id)
                    .with_error(e.to_string()),
            );
            cell.stop();
        }
    }

    /// Invokes one timed `work_step` and applies the quarantine policy.
    async fn run_step(&self, cell: &Arc<ServiceCell>) {
        let started = Instant::now();
        let result = run_guarded(cell.service().work_step(cell.context())).await;
        let elapsed = started.elapsed();

        match result {
            Ok(()) => cell.record_step(elapsed.as_nanos() as u64),
            Err(e) => {
                let streak = cell.record_error();
                self.bus.publish(
                    Event::now(EventKind::ServiceStepFailed)
                        .with_service(cell.name())
                        .with_worker(self.id)
                        .with_streak(streak)
                        .with_error(e.to_string()),
                );
                if e.is_fatal() || streak >= self.error_threshold() {
                    cell.stop();
                    self.bus.publish(
                        Event::now(EventKind::ServiceQuarantined)
                            .with_service(cell.name())
                            .with_worker(self.id)
                            .with_streak(streak),
                    );
                }
            }
        }
    }
}

/// Awaits a user callback, converting a panic into a fatal error so the
/// worker loop survives arbitrary callback failures.
async fn run_guarded<F>(fut: F) -> Result<(), ServiceError>
where
    F: std::future::Future<Output = Result<(), ServiceError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ServiceError::Fatal {
            reason: panic_reason(&panic),
        }),
    }
}

fn panic_reason(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic".to_string()
    }
}
