//! # Message routing into service inboxes.
//!
//! The routing rules live in [`route`]: resolve the target name in the
//! directory and offer the envelope to its inbox. Failures never escape as
//! panics: the caller gets a [`RouteError`] and a `MessageDropped` event is
//! published for observability. There is no retry, no backpressure, and no
//! dead-letter queue.
//!
//! [`Router`] is the non-owning handle embedded in every
//! [`ServiceContext`](crate::ServiceContext): it holds a weak reference to
//! the scheduler's directory, so a service handle can never keep the
//! runtime alive (ownership stays with the scheduler).

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::error::RouteError;
use crate::events::{Bus, Event, EventKind};
use crate::messages::Envelope;

use super::cell::ServiceCell;

/// Directory type shared between the scheduler and the routers.
pub(crate) type Directory = DashMap<String, Arc<ServiceCell>>;

/// Delivers an envelope to the named service's inbox.
pub(crate) fn route(
    directory: &Directory,
    bus: &Bus,
    target: &str,
    envelope: Envelope,
) -> Result<(), RouteError> {
    if target.is_empty() {
        let err = RouteError::EmptyTarget;
        bus.publish(Event::now(EventKind::MessageDropped).with_error(err.as_label()));
        return Err(err);
    }
    let Some(cell) = directory.get(target).map(|entry| Arc::clone(entry.value())) else {
        let err = RouteError::UnknownTarget {
            name: target.to_string(),
        };
        bus.publish(
            Event::now(EventKind::MessageDropped)
                .with_service(target)
                .with_error(err.as_label()),
        );
        return Err(err);
    };
    if cell.offer(envelope) {
        Ok(())
    } else {
        let err = RouteError::InboxFull {
            name: target.to_string(),
        };
        bus.publish(
            Event::now(EventKind::MessageDropped)
                .with_service(target)
                .with_error(err.as_label()),
        );
        Err(err)
    }
}

/// Non-owning send handle given to each registered service.
#[derive(Clone)]
pub(crate) struct Router {
    directory: Weak<Directory>,
    bus: Bus,
}

impl Router {
    pub(crate) fn new(directory: Weak<Directory>, bus: Bus) -> Self {
        Self { directory, bus }
    }

    /// Sends an envelope to the named service, if the runtime still
    /// exists.
    pub(crate) fn send(&self, target: &str, envelope: Envelope) -> Result<(), RouteError> {
        match self.directory.upgrade() {
            Some(directory) => route(&directory, &self.bus, target, envelope),
            None => {
                let err = RouteError::RuntimeDown;
                self.bus
                    .publish(Event::now(EventKind::MessageDropped).with_error(err.as_label()));
                Err(err)
            }
        }
    }
}
