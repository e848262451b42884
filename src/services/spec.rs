//! # Service specification for registration.
//!
//! Defines [`ServiceSpec`] — a configuration bundle that describes how a
//! service should be run (period, placement, inbox capacity).
//!
//! A spec can be created:
//! - **Explicitly** with [`ServiceSpec::new`] (full control)
//! - **From config** with [`ServiceSpec::with_defaults`] (inherit defaults)
//!
//! The spec is then passed to
//! [`Scheduler::register`](crate::Scheduler::register). A zero period or
//! zero inbox capacity is clamped to the configured default at
//! registration time, with a `ConfigAdjusted` diagnostic.

use std::time::Duration;

use crate::config::Config;

use super::placement::Placement;
use super::service::ServiceRef;

/// # Specification for running a service under the scheduler.
///
/// Bundles together:
/// - The service itself ([`ServiceRef`])
/// - The requested period between work steps
/// - The placement policy ([`Placement`])
/// - The inbox capacity
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use servitor::{Config, Placement, ServiceError, ServiceFn, ServiceSpec};
///
/// let demo = ServiceFn::arc("demo", |_ctx| async move { Ok::<_, ServiceError>(()) });
///
/// // Explicit configuration:
/// let spec = ServiceSpec::new(demo.clone(), Duration::from_millis(20), Placement::Pinned(1), 64);
/// assert_eq!(spec.placement(), Placement::Pinned(1));
///
/// // Inherit from global config:
/// let cfg = Config::default();
/// let spec2 = ServiceSpec::with_defaults(demo, &cfg);
/// assert_eq!(spec2.period(), cfg.default_period);
/// ```
#[derive(Clone)]
pub struct ServiceSpec {
    /// Reference to the service to be driven.
    service: ServiceRef,
    /// Requested minimum interval between work steps.
    period: Duration,
    /// Which worker the service lands on.
    placement: Placement,
    /// Capacity of the service's private inbox.
    inbox_capacity: usize,
}

impl ServiceSpec {
    /// Creates a new service specification with explicit parameters.
    ///
    /// ### Parameters
    /// - `service`: service to drive
    /// - `period`: requested period (zero → configured default)
    /// - `placement`: pinned worker or least-loaded
    /// - `inbox_capacity`: inbox slots (zero → configured default)
    pub fn new(
        service: ServiceRef,
        period: Duration,
        placement: Placement,
        inbox_capacity: usize,
    ) -> Self {
        Self {
            service,
            period,
            placement,
            inbox_capacity,
        }
    }

    /// Creates a service specification inheriting defaults from global
    /// config.
    pub fn with_defaults(service: ServiceRef, cfg: &Config) -> Self {
        Self {
            service,
            period: cfg.default_period,
            placement: Placement::Any,
            inbox_capacity: cfg.inbox_capacity,
        }
    }

    /// Returns reference to the service.
    pub fn service(&self) -> &ServiceRef {
        &self.service
    }

    /// Returns the requested period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns the placement policy.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Returns the requested inbox capacity.
    pub fn inbox_capacity(&self) -> usize {
        self.inbox_capacity
    }
}
