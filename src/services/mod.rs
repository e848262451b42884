//! # Service abstractions and specifications.
//!
//! This module provides the user-facing service types:
//! - [`Service`] - trait for implementing lifecycle-driven services
//! - [`ServiceRef`] - shared reference to a service (`Arc<dyn Service>`)
//! - [`ServiceFn`] - function-backed service implementation
//! - [`ServiceContext`] - per-registration capabilities (name, period,
//!   running flag, inbox, outbound send)
//! - [`ServiceSpec`] - specification bundling a service with its period,
//!   placement, and inbox capacity
//! - [`Placement`] - pinned or least-loaded worker selection

mod context;
mod func;
mod placement;
mod service;
mod spec;

pub use context::ServiceContext;
pub use func::ServiceFn;
pub use placement::Placement;
pub use service::{Service, ServiceRef};
pub use spec::ServiceSpec;
