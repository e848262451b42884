//! # servitor
//!
//! **Servitor** is a lightweight in-process service runtime.
//!
//! A fixed pool of workers cooperatively drives a set of long-lived user
//! services: each service periodically runs a unit of work and/or consumes
//! messages from its own bounded inbox. The runtime paces every service by
//! its requested period, distributes services across workers (pinned or
//! least-loaded), routes messages between services by logical name,
//! measures per-service step performance, and automatically quarantines
//! services that keep failing.
//!
//! ## Features
//!
//! | Area             | Description                                                    | Key types / traits                           |
//! |------------------|----------------------------------------------------------------|----------------------------------------------|
//! | **Services**     | Lifecycle contract: setup → paced steps → stop → cleanup.      | [`Service`], [`ServiceFn`], [`ServiceRef`]   |
//! | **Registration** | Bundle a service with period, placement, and inbox capacity.   | [`ServiceSpec`], [`Placement`]               |
//! | **Scheduling**   | Worker pool, placement, completion sweeps, graceful shutdown.  | [`Scheduler`], [`Worker`]                    |
//! | **Messaging**    | Named routing into bounded per-service inboxes.                | [`Envelope`], [`Inbox`]                      |
//! | **Metrics**      | Per-service step counters with copy-out snapshots.             | [`ServiceMetrics`], [`MetricsSnapshot`]      |
//! | **Observability**| Runtime diagnostics as events with pluggable subscribers.      | [`Event`], [`EventKind`], [`Subscribe`]      |
//! | **Errors**       | Typed errors for runtime, callbacks, and routing.              | [`RuntimeError`], [`ServiceError`], [`RouteError`] |
//! | **Configuration**| Centralized runtime settings with clamped defaults.            | [`Config`]                                   |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber
//!   _(demo/reference only)_.
//!
//! ```no_run
//! use std::time::Duration;
//! use servitor::{Config, Placement, Scheduler, ServiceError, ServiceFn, ServiceSpec};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.max_workers = 2;
//!     cfg.tick = Duration::from_millis(20);
//!
//!     let scheduler = Scheduler::new(cfg, Vec::new());
//!
//!     // A simple periodic service.
//!     let ticker = ServiceFn::arc("ticker", |ctx| async move {
//!         if ctx.is_running() {
//!             println!("tick from {}", ctx.name());
//!         }
//!         Ok::<_, ServiceError>(())
//!     });
//!     scheduler.register(ServiceSpec::new(
//!         ticker,
//!         Duration::from_millis(250),
//!         Placement::Any,
//!         64,
//!     ))?;
//!
//!     scheduler.start_all();
//!     tokio::time::sleep(Duration::from_secs(1)).await;
//!     scheduler.stop_all().await?;
//!     Ok(())
//! }
//! ```
//!
//! ---

mod config;
mod core;
mod error;
mod events;
mod messages;
mod metrics;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{wait_for_shutdown_signal, Scheduler, ServiceCell, Worker};
pub use error::{RouteError, RuntimeError, ServiceError};
pub use events::{Bus, Event, EventKind};
pub use messages::{Envelope, Inbox, DEFAULT_INBOX_CAPACITY};
pub use metrics::{MetricsSnapshot, ServiceMetrics};
pub use services::{Placement, Service, ServiceContext, ServiceFn, ServiceRef, ServiceSpec};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
