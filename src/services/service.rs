//! # Service abstraction.
//!
//! This module defines the [`Service`] trait (the lifecycle contract every
//! unit of user code implements) and [`ServiceRef`], the shared handle the
//! runtime passes around.
//!
//! A service lives on exactly one worker for its whole lifetime:
//! `setup` runs at most once, `work_step` runs whenever the service's
//! period has elapsed, and `cleanup` runs at most once after the service
//! has left its worker. All callbacks receive the service's
//! [`ServiceContext`] and may fail with a [`ServiceError`]; failures are
//! counted by the worker and can lead to auto-quarantine.
//!
//! The default `work_step` drains the inbox, invoking [`Service::handle`]
//! per message and re-checking the running flag between messages. Override
//! `work_step` for work that is not message-driven.
//!
//! # Example
//! ```
//! use async_trait::async_trait;
//! use servitor::{Envelope, Service, ServiceContext, ServiceError};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Service for Echo {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     async fn handle(
//!         &self,
//!         envelope: Envelope,
//!         _ctx: &ServiceContext,
//!     ) -> Result<(), ServiceError> {
//!         println!("echo: {}", envelope.kind());
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::messages::Envelope;

use super::context::ServiceContext;

/// # Shared handle to a service object.
///
/// This is the primary type used by the scheduler and specs.
pub type ServiceRef = Arc<dyn Service>;

/// # Long-lived unit of user code driven by a worker.
///
/// Implementors provide a stable [`name`](Service::name) and override the
/// lifecycle callbacks they need; every default is a no-op except
/// [`work_step`](Service::work_step), which drains the inbox.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Returns the stable logical name the service is registered under.
    fn name(&self) -> &str;

    /// One-time initialization, invoked by the owning worker before the
    /// first step. A failure stops the service; no step is ever attempted.
    async fn setup(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        Ok(())
    }

    /// One unit of work, invoked whenever the service's period has
    /// elapsed.
    ///
    /// The default implementation drains the inbox: poll, hand each
    /// message to [`handle`](Service::handle), and break out as soon as
    /// the inbox is empty or the running flag goes down.
    async fn work_step(&self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        while let Some(envelope) = ctx.inbox().poll() {
            self.handle(envelope, ctx).await?;
            if !ctx.is_running() {
                break;
            }
        }
        Ok(())
    }

    /// Processes one inbox message. Only reached through the default
    /// [`work_step`](Service::work_step); the default implementation
    /// discards the message.
    async fn handle(&self, envelope: Envelope, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        let _ = envelope;
        Ok(())
    }

    /// One-time teardown, invoked after the service has left its worker.
    /// Failures are reported but never block the removal.
    async fn cleanup(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        Ok(())
    }

    /// Signals that the service is done and may be reaped.
    ///
    /// The default is "complete once stopped"; override to self-terminate
    /// (return `true` when the service's mission is accomplished).
    fn is_complete(&self, ctx: &ServiceContext) -> bool {
        !ctx.is_running()
    }
}
