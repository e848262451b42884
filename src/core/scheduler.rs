//! # Scheduler: owns the worker pool, places services, routes messages.
//!
//! The [`Scheduler`] is the facade the embedding application talks to. It
//! owns the runtime components (event bus, subscriber fan-out, worker pool,
//! name directory) and exposes the full steady-state surface: register,
//! start, send, sweep, observe, stop.
//!
//! ## Architecture
//! ```text
//! ServiceSpec ──► Scheduler::register()
//!                     │
//!                     ├──► directory: name → ServiceCell   (routing, lookup)
//!                     └──► worker (pinned or least-loaded) (driving)
//!
//! Scheduler::start_all()
//!                     ├──► spawn fan-out listener (bus → SubscriberSet)
//!                     └──► spawn one tick loop per worker
//!
//! steady state:  send(name, envelope) / reap_completed() / all_metrics()
//!
//! Scheduler::stop_all()
//!                     ├──► publish ShutdownRequested, cancel every worker
//!                     └──► join workers, bounded by Config::grace
//! ```
//!
//! ## Rules
//! - A service is in the directory iff it sits on exactly one worker.
//! - Duplicate logical names are rejected, never overwritten.
//! - Placement is size-based only: pinned index when valid, otherwise the
//!   least-loaded worker with ties broken by lowest index.
//! - Routing failures return an error to the caller and publish a
//!   `MessageDropped` event; nothing is retried.
//! - The sweep removes exactly the services whose `is_complete()` reports
//!   true: stop → cleanup → drop, then the directory entry, then the
//!   status log is rebuilt.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::config::Config;
use crate::error::{RouteError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::messages::{Envelope, Inbox};
use crate::metrics::MetricsSnapshot;
use crate::services::{Placement, ServiceContext, ServiceSpec};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::cell::ServiceCell;
use super::router::{route, Directory, Router};
use super::shutdown;
use super::worker::Worker;

/// Facade over the worker pool, the name directory, and the router.
pub struct Scheduler {
    /// Normalized runtime configuration.
    cfg: Config,
    /// Event bus shared with workers and routers.
    bus: Bus,
    /// Fan-out set for subscribers.
    subs: Arc<SubscriberSet>,
    /// Fixed worker pool, sized at construction.
    workers: Vec<Arc<Worker>>,
    /// name → registration; pruned by the sweep.
    directory: Arc<Directory>,
    /// worker index → human-readable summary (non-empty workers only).
    status: Mutex<HashMap<usize, String>>,
    /// Join handles of spawned worker loops.
    handles: Mutex<Vec<JoinHandle<()>>>,
    /// Receiver feeding the fan-out listener, taken by `start_all`.
    listener_rx: Mutex<Option<broadcast::Receiver<Event>>>,
}

impl Scheduler {
    /// Creates the scheduler and its (idle) worker pool.
    ///
    /// The configuration is normalized first; every clamped field is
    /// reported with a `ConfigAdjusted` event. When `subscribers` is
    /// non-empty this must be called within a Tokio runtime (each
    /// subscriber gets a dedicated worker task).
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let (cfg, adjusted) = cfg.normalized();
        let bus = Bus::new(cfg.bus_capacity);
        // Subscribe before anything publishes so early diagnostics are
        // buffered for the fan-out listener.
        let listener_rx = if subscribers.is_empty() {
            None
        } else {
            Some(bus.subscribe())
        };
        for label in adjusted {
            bus.publish(Event::now(EventKind::ConfigAdjusted).with_error(label));
        }

        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        let workers = (0..cfg.max_workers)
            .map(|id| Arc::new(Worker::new(id, &cfg, bus.clone())))
            .collect();

        Self {
            cfg,
            bus,
            subs,
            workers,
            directory: Arc::new(Directory::new()),
            status: Mutex::new(HashMap::new()),
            handles: Mutex::new(Vec::new()),
            listener_rx: Mutex::new(listener_rx),
        }
    }

    /// Returns the normalized configuration in effect.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the worker pool (read-only view).
    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    /// Subscribes a raw receiver to the runtime's event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Registers a service and places it on a worker.
    ///
    /// Zero periods and zero inbox capacities are clamped to the configured
    /// defaults; an out-of-range pinned index falls back to the
    /// least-loaded worker. Each adjustment publishes a diagnostic.
    /// Duplicate logical names are rejected.
    pub fn register(&self, spec: ServiceSpec) -> Result<(), RuntimeError> {
        let name = spec.service().name().to_string();
        if self.directory.contains_key(&name) {
            return Err(RuntimeError::ServiceAlreadyExists { name });
        }

        let period = if spec.period().is_zero() {
            self.bus.publish(
                Event::now(EventKind::ConfigAdjusted)
                    .with_service(&name)
                    .with_error("period_clamped"),
            );
            self.cfg.default_period
        } else {
            spec.period()
        };
        let capacity = if spec.inbox_capacity() == 0 {
            self.bus.publish(
                Event::now(EventKind::ConfigAdjusted)
                    .with_service(&name)
                    .with_error("inbox_capacity_clamped"),
            );
            self.cfg.inbox_capacity
        } else {
            spec.inbox_capacity()
        };
        let worker_index = self.place(&name, spec.placement());

        let router = Router::new(Arc::downgrade(&self.directory), self.bus.clone());
        let ctx = ServiceContext::new(
            name.clone(),
            period,
            Inbox::with_capacity(capacity),
            router,
        );
        let cell = Arc::new(ServiceCell::new(Arc::clone(spec.service()), ctx));

        {
            use dashmap::mapref::entry::Entry;
            match self.directory.entry(name.clone()) {
                Entry::Occupied(_) => {
                    return Err(RuntimeError::ServiceAlreadyExists { name });
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(Arc::clone(&cell));
                }
            }
        }
        self.workers[worker_index].add_service(cell);

        self.bus.publish(
            Event::now(EventKind::ServiceRegistered)
                .with_service(&name)
                .with_worker(worker_index),
        );
        self.update_status(worker_index);
        Ok(())
    }

    /// Starts every worker that is not yet running. Picked up dynamically:
    /// services registered afterwards are driven from their next tick.
    pub fn start_all(&self) {
        self.spawn_listener();
        let mut handles = self.handles.lock().expect("handle list poisoned");
        for worker in &self.workers {
            if worker.mark_started() {
                let worker = Arc::clone(worker);
                handles.push(tokio::spawn(worker.run()));
            } else {
                self.bus.publish(
                    Event::now(EventKind::WorkerStarted)
                        .with_worker(worker.id())
                        .with_error("already_running"),
                );
            }
        }
    }

    /// Sends a message to the named service's inbox.
    ///
    /// Never blocks. An empty name, an unknown target, or a full inbox
    /// drops the message, publishes a `MessageDropped` event, and reports
    /// the reason to the caller.
    pub fn send(&self, target: &str, envelope: Envelope) -> Result<(), RouteError> {
        route(&self.directory, &self.bus, target, envelope)
    }

    /// Looks up a registered service by logical name.
    pub fn get(&self, name: &str) -> Option<Arc<ServiceCell>> {
        self.directory
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Removes every service whose `is_complete()` reports true:
    /// stop → cleanup → drop from the worker, then from the directory.
    /// Rebuilds the status log afterwards. Returns the number of services
    /// removed; calling it again immediately removes nothing.
    pub async fn reap_completed(&self) -> usize {
        let mut removed = 0;
        for worker in &self.workers {
            for cell in worker.snapshot_services() {
                if cell.is_complete() && worker.remove_service(cell.name()).await {
                    self.directory.remove(cell.name());
                    removed += 1;
                }
            }
        }
        self.rebuild_status();
        removed
    }

    /// Collects a metrics snapshot per service name across all workers.
    pub fn all_metrics(&self) -> HashMap<String, MetricsSnapshot> {
        let mut out = HashMap::new();
        for worker in &self.workers {
            // Names are unique by the registration contract; a collision
            // would be last-write-wins.
            out.extend(worker.snapshot_metrics());
        }
        out
    }

    /// Returns the human-readable status summary per non-empty worker.
    pub fn status_log(&self) -> HashMap<usize, String> {
        self.status.lock().expect("status log poisoned").clone()
    }

    /// Requests every worker to stop and joins them, bounded by the
    /// configured grace period. Services keep their registrations; a
    /// driver that wants cleanup sweeps before stopping.
    pub async fn stop_all(&self) -> Result<(), RuntimeError> {
        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        for worker in &self.workers {
            worker.stop();
        }

        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.handles.lock().expect("handle list poisoned");
            guard.drain(..).collect()
        };
        let join_all = async {
            for handle in handles {
                let _ = handle.await;
            }
        };

        match timeout(self.cfg.grace, join_all).await {
            Ok(()) => {
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::now(EventKind::GraceExceeded));
                let stuck = self
                    .workers
                    .iter()
                    .filter(|worker| worker.is_started() && !worker.has_exited())
                    .flat_map(|worker| worker.service_names())
                    .collect();
                Err(RuntimeError::GraceExceeded {
                    grace: self.cfg.grace,
                    stuck,
                })
            }
        }
    }

    /// Convenience driver: start the pool, wait for a termination signal,
    /// then perform the graceful shutdown.
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        self.start_all();
        let _ = shutdown::wait_for_shutdown_signal().await;
        self.stop_all().await
    }

    /// Picks the worker index for a placement request.
    fn place(&self, name: &str, placement: Placement) -> usize {
        match placement {
            Placement::Pinned(index) if index < self.workers.len() => index,
            Placement::Pinned(index) => {
                let fallback = self.least_loaded();
                self.bus.publish(
                    Event::now(EventKind::ConfigAdjusted)
                        .with_service(name)
                        .with_worker(fallback)
                        .with_error(format!("preferred_worker_out_of_range:{index}")),
                );
                fallback
            }
            Placement::Any => self.least_loaded(),
        }
    }

    /// Index of the worker with the fewest services; ties go to the lowest
    /// index.
    fn least_loaded(&self) -> usize {
        self.workers
            .iter()
            .enumerate()
            .min_by_key(|(index, worker)| (worker.len(), *index))
            .map(|(index, _)| index)
            .expect("worker pool is never empty")
    }

    /// Spawns the bus → subscriber fan-out listener (first `start_all`
    /// only, and only when subscribers were attached).
    fn spawn_listener(&self) {
        let Some(mut rx) = self
            .listener_rx
            .lock()
            .expect("listener receiver poisoned")
            .take()
        else {
            return;
        };
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => subs.emit(&ev),
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
        });
    }

    /// Recomputes the status entry of one worker.
    fn update_status(&self, index: usize) {
        let mut status = self.status.lock().expect("status log poisoned");
        match Self::summarize(&self.workers[index]) {
            Some(line) => {
                status.insert(index, line);
            }
            None => {
                status.remove(&index);
            }
        }
    }

    /// Recomputes the whole status log; empty workers are omitted.
    fn rebuild_status(&self) {
        let mut status = self.status.lock().expect("status log poisoned");
        status.clear();
        for worker in &self.workers {
            if let Some(line) = Self::summarize(worker) {
                status.insert(worker.id(), line);
            }
        }
    }

    fn summarize(worker: &Worker) -> Option<String> {
        let names = worker.service_names();
        if names.is_empty() {
            return None;
        }
        Some(format!(
            "worker-{} manages {} services: [{}]",
            worker.id(),
            names.len(),
            names.join(", ")
        ))
    }
}
