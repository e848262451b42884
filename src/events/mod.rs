//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to diagnostics emitted by the scheduler, the workers,
//! and the message router.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scheduler` (registration, placement fallbacks,
//!   routing failures, shutdown), `Worker` (start/stop, setup and step
//!   failures, quarantine, removal), `SubscriberSet` workers
//!   (overflow/panic).
//! - **Consumers**: the scheduler's fan-out listener, which forwards every
//!   event to the attached [`Subscribe`](crate::Subscribe) implementations.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
