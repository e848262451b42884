//! Runtime core: worker pool, placement, routing, orchestration.
//!
//! ## Files & responsibilities
//! - **scheduler.rs**: public facade; owns the bus, the subscriber fan-out,
//!   the worker pool, and the name directory; places services, routes
//!   messages, sweeps completions, aggregates metrics and status, drives
//!   graceful shutdown.
//! - **worker.rs**: the tick loop; snapshots its assignments each tick,
//!   steps due services, captures metrics, auto-quarantines after repeated
//!   failures, runs removal (stop → cleanup → drop).
//! - **cell.rs**: per-registration state (service + context + metrics +
//!   last-step timestamp + setup/cleanup once-flags); the read surface
//!   returned by `Scheduler::get`.
//! - **router.rs**: delivery of envelopes into inboxes; the non-owning
//!   `Router` handle embedded in every service context.
//! - **clock.rs**: process-wide monotonic nanosecond timeline with 0
//!   reserved as the "never ran" sentinel.
//! - **shutdown.rs**: cross-platform OS signal handling used by
//!   `Scheduler::run_until_signal`.
//!
//! ## Wiring (module-level flow)
//! ```text
//! Application code
//!   └─ builds ServiceSpec, creates Scheduler, register() + start_all()
//!
//! Scheduler::start_all()
//!   ├─ spawn fan-out listener (bus → SubscriberSet)
//!   └─ spawn Worker::run() per worker      ──┐
//!                                            │ each tick
//! Worker::run()                              ▼
//!   snapshot services → due-check → setup?/work_step → metrics/quarantine
//!
//! Scheduler::send(name, envelope)
//!   └─ router::route → directory lookup → Inbox::offer (never blocks)
//!
//! Scheduler::reap_completed()
//!   └─ per worker: is_complete? → remove (stop → cleanup → drop)
//!                → prune directory → rebuild status log
//!
//! Scheduler::stop_all()
//!   └─ ShutdownRequested → cancel workers → join within Config::grace
//!      → AllStoppedWithin | GraceExceeded{stuck}
//! ```

mod cell;
mod clock;
pub(crate) mod router;
mod scheduler;
mod shutdown;
mod worker;

pub use cell::ServiceCell;
pub use scheduler::Scheduler;
pub use shutdown::wait_for_shutdown_signal;
pub use worker::Worker;
