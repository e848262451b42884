//! # Runtime events emitted by the scheduler, workers, and router.
//!
//! [`EventKind`] classifies event types across a few categories:
//! - **Worker events**: worker loop start/stop.
//! - **Service lifecycle events**: registration, setup/step/cleanup
//!   failures, quarantine, removal.
//! - **Routing events**: dropped messages and unknown targets.
//! - **Shutdown events**: shutdown request and grace-period outcomes.
//! - **Subscriber events**: overflow and panic diagnostics of the
//!   observability fan-out itself.
//!
//! The [`Event`] struct carries optional metadata such as the service name,
//! the worker index, an error label, and the consecutive-error streak.
//! Every diagnostic surface of the runtime ("logged" in prose) is one of
//! these events; attach a [`Subscribe`](crate::Subscribe) implementation to
//! consume them.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically, so events can be ordered correctly even when delivered
//! out of order through async channels.
//!
//! ## Example
//! ```rust
//! use servitor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::ServiceQuarantined)
//!     .with_service("parser")
//!     .with_worker(2)
//!     .with_streak(3)
//!     .with_error("step failed: boom");
//!
//! assert_eq!(ev.kind, EventKind::ServiceQuarantined);
//! assert_eq!(ev.service.as_deref(), Some("parser"));
//! assert_eq!(ev.streak, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    SubscriberPanicked,
    /// Subscriber dropped an event (queue full or worker closed).
    SubscriberOverflow,

    // === Shutdown events ===
    /// Shutdown requested by the embedding application.
    ShutdownRequested,
    /// All workers exited within the configured grace period.
    AllStoppedWithin,
    /// Grace period exceeded; some workers were still busy.
    GraceExceeded,

    // === Worker events ===
    /// A worker's tick loop has started.
    WorkerStarted,
    /// A worker's tick loop has exited.
    WorkerStopped,

    // === Service lifecycle events ===
    /// A service was registered and placed on a worker.
    ServiceRegistered,
    /// A service's `setup` callback failed; the service was stopped.
    ServiceSetupFailed,
    /// A service's `work_step` callback failed.
    ServiceStepFailed,
    /// A service reached the consecutive-error threshold (or failed
    /// fatally) and was stopped by its worker.
    ServiceQuarantined,
    /// A service's `cleanup` callback failed during removal.
    ServiceCleanupFailed,
    /// A service was removed from its worker and the directory.
    ServiceRemoved,
    /// An operation referenced a service that is not assigned.
    ServiceNotFound,

    // === Routing events ===
    /// A message could not be delivered and was dropped.
    MessageDropped,

    // === Configuration events ===
    /// An invalid configuration value was clamped to its default.
    ConfigAdjusted,
}

/// Runtime event with optional metadata.
///
/// ## Fields
/// - `seq`: unique sequence number for ordering (monotonically increasing)
/// - `at`: wall-clock timestamp (may go backwards due to NTP; logging only)
/// - `kind`: event classification
/// - `service`, `worker`, `error`, `streak`: optional metadata
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Logical name of the service, if applicable.
    pub service: Option<String>,
    /// Index of the worker, if applicable.
    pub worker: Option<usize>,
    /// Error message or label, if the event represents a failure.
    pub error: Option<String>,
    /// Consecutive-error streak at the time of the event, if relevant.
    pub streak: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            worker: None,
            error: None,
            streak: None,
        }
    }

    /// Attaches a service name.
    pub fn with_service(mut self, name: impl Into<String>) -> Self {
        self.service = Some(name.into());
        self
    }

    /// Attaches a worker index.
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches an error message or label.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    /// Attaches a consecutive-error streak.
    pub fn with_streak(mut self, streak: u32) -> Self {
        self.streak = Some(streak);
        self
    }

    /// Creates a subscriber overflow event.
    ///
    /// Emitted when a subscriber's queue is full and an event is dropped.
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_error(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    ///
    /// Emitted when a subscriber panics during event processing.
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_error(info)
    }
}
