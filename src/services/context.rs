//! # Per-registration context handed to service callbacks.
//!
//! A [`ServiceContext`] bundles the runtime capabilities of one registered
//! service: its logical name, requested period, cooperative running flag,
//! private [`Inbox`], and a non-owning handle to the scheduler's router for
//! outbound sends.
//!
//! The running flag is a [`CancellationToken`] and therefore monotonic:
//! it starts live and [`ServiceContext::stop`] is irreversible. The owning
//! worker observes the flag before each step; the default
//! [`work_step`](crate::Service::work_step) checks it between drained
//! messages, making every drain iteration a cooperative stop-point.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::router::Router;
use crate::error::RouteError;
use crate::messages::{Envelope, Inbox};

/// Runtime capabilities of one registered service.
///
/// Cloning is cheap; all state is shared with the registration that
/// created the context.
#[derive(Clone)]
pub struct ServiceContext {
    /// Logical name the service is registered and addressed under.
    name: Arc<str>,
    /// Requested minimum interval between work steps.
    period: Duration,
    /// Cooperative running flag; cancelled means stopped.
    token: CancellationToken,
    /// Private bounded inbox.
    inbox: Inbox,
    /// Non-owning send handle into the scheduler's directory.
    router: Router,
}

impl ServiceContext {
    pub(crate) fn new(
        name: impl Into<Arc<str>>,
        period: Duration,
        inbox: Inbox,
        router: Router,
    ) -> Self {
        Self {
            name: name.into(),
            period,
            token: CancellationToken::new(),
            inbox,
            router,
        }
    }

    /// Returns the logical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the requested period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns true until [`stop`](Self::stop) has been called.
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Requests a cooperative stop. Irreversible.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Returns the service's private inbox.
    pub fn inbox(&self) -> &Inbox {
        &self.inbox
    }

    /// Sends a message to another service by logical name.
    ///
    /// Never blocks; a full inbox or unknown target is reported as an
    /// error and the message is dropped.
    pub fn send(&self, target: &str, envelope: Envelope) -> Result<(), RouteError> {
        self.router.send(target, envelope)
    }
}
