//! # Function-backed service implementation.
//!
//! [`ServiceFn`] wraps a closure `Fnc: FnMut(ServiceContext) -> Fut` as the
//! service's `work_step`. The closure is protected by a [`Mutex`] to allow
//! calling `work_step(&self, ...)` repeatedly even though the closure is
//! `FnMut`; the lock is held only while the future is created, never while
//! it runs. Use [`ServiceFn::arc`] for a one-liner that returns a
//! [`ServiceRef`].
//!
//! # Example
//! ```
//! use servitor::{ServiceError, ServiceFn, ServiceRef};
//!
//! let ticker: ServiceRef = ServiceFn::arc("ticker", |ctx| async move {
//!     if !ctx.is_running() {
//!         return Ok(());
//!     }
//!     // do one unit of work...
//!     Ok::<_, ServiceError>(())
//! });
//!
//! assert_eq!(ticker.name(), "ticker");
//! ```

use std::{borrow::Cow, future::Future, sync::Mutex};

use async_trait::async_trait;

use crate::error::ServiceError;

use super::context::ServiceContext;
use super::service::{Service, ServiceRef};

/// Service whose `work_step` is a closure.
///
/// The closure receives an owned clone of the [`ServiceContext`], so it can
/// move the context into the returned future. State captured by the closure
/// and touched *inside* the future needs its own synchronization; the
/// internal mutex only guards future creation.
#[derive(Debug)]
pub struct ServiceFn<Fnc, Fut>
where
    Fnc: FnMut(ServiceContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    /// Stable logical name.
    name: Cow<'static, str>,
    /// Underlying function (guarded by a mutex to allow `FnMut` with `&self`).
    func: Mutex<Fnc>,
}

impl<Fnc, Fut> ServiceFn<Fnc, Fut>
where
    Fnc: FnMut(ServiceContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    /// Creates a new function-backed service.
    ///
    /// Prefer [`ServiceFn::arc`] when you immediately need a [`ServiceRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, func: Fnc) -> Self {
        Self {
            name: name.into(),
            func: Mutex::new(func),
        }
    }

    /// Creates the service and returns it as a shared handle
    /// (`Arc<dyn Service>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, func: Fnc) -> ServiceRef {
        std::sync::Arc::new(Self::new(name, func))
    }
}

#[async_trait]
impl<Fnc, Fut> Service for ServiceFn<Fnc, Fut>
where
    Fnc: FnMut(ServiceContext) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn work_step(&self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        let fut = {
            let mut f = self.func.lock().map_err(|_| ServiceError::Fatal {
                reason: "mutex poisoned".into(),
            })?;
            (f)(ctx.clone())
        };
        fut.await
    }
}
