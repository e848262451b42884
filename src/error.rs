//! # Error types used by the servitor runtime and user services.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`] errors raised by the scheduler/orchestration layer.
//! - [`ServiceError`] errors raised by user service callbacks.
//! - [`RouteError`] failures reported by the message router.
//!
//! All types provide `as_label` helpers for event and metric tagging.
//! [`ServiceError`] additionally exposes `is_fatal()`, which the worker uses
//! to quarantine a service immediately instead of waiting for the
//! consecutive-error threshold.

use std::time::Duration;

use thiserror::Error;

/// # Errors produced by the servitor runtime.
///
/// These represent failures of the orchestration layer itself, not of the
/// user services it drives.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Attempted to register a service under a logical name that is already
    /// taken. Names are the routing keys; the runtime never overwrites a
    /// live registration.
    #[error("service '{name}' is already registered")]
    ServiceAlreadyExists {
        /// The duplicate logical name.
        name: String,
    },
    /// Shutdown grace period was exceeded; some workers were still driving
    /// services when the deadline passed.
    #[error("shutdown grace {grace:?} exceeded; stuck services: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of services assigned to workers that did not exit in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in events/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::ServiceAlreadyExists { .. } => "runtime_service_already_exists",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }
}

/// # Errors produced by user service callbacks.
///
/// Returned from `setup`, `work_step`, `handle`, and `cleanup`. The worker
/// counts every failure toward the service's consecutive-error streak; a
/// [`ServiceError::Fatal`] (including a caught panic) quarantines the
/// service immediately.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Callback failed but the service may recover on a later step.
    #[error("step failed: {reason}")]
    Failed { reason: String },

    /// Non-recoverable failure; the service is stopped without waiting for
    /// the consecutive-error threshold.
    #[error("fatal error: {reason}")]
    Fatal { reason: String },
}

impl ServiceError {
    /// Convenience constructor for a retryable failure.
    pub fn failed(reason: impl Into<String>) -> Self {
        ServiceError::Failed {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for a fatal failure.
    pub fn fatal(reason: impl Into<String>) -> Self {
        ServiceError::Fatal {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::Failed { .. } => "service_failed",
            ServiceError::Fatal { .. } => "service_fatal",
        }
    }

    /// Indicates whether the error quarantines the service immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ServiceError::Fatal { .. })
    }
}

/// # Failures reported by the message router.
///
/// Routing never panics and never blocks: every failure is returned to the
/// caller, which decides what to do with the undelivered message. The
/// router also publishes a `MessageDropped` event for each failure.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RouteError {
    /// The target name was empty.
    #[error("empty target name")]
    EmptyTarget,

    /// No service is registered under the target name.
    #[error("no service registered under '{name}'")]
    UnknownTarget { name: String },

    /// The target's inbox was full; the message was dropped.
    #[error("inbox of '{name}' is full")]
    InboxFull { name: String },

    /// The runtime that owned the directory has been dropped.
    #[error("runtime is gone")]
    RuntimeDown,
}

impl RouteError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            RouteError::EmptyTarget => "route_empty_target",
            RouteError::UnknownTarget { .. } => "route_unknown_target",
            RouteError::InboxFull { .. } => "route_inbox_full",
            RouteError::RuntimeDown => "route_runtime_down",
        }
    }
}
