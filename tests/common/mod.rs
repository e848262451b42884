//! Shared fixtures for the integration suite: small concrete services and
//! a condition-polling helper for timing-sensitive assertions.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use servitor::{Envelope, Service, ServiceContext, ServiceError};

/// Raw message payload fed into a pipeline.
pub struct Raw(pub String);

/// Transformed payload forwarded between services.
pub struct Parsed(pub String);

/// Polls `cond` every few milliseconds until it holds or `deadline`
/// elapses. Returns whether the condition was observed.
pub async fn wait_until(deadline: Duration, cond: impl Fn() -> bool) -> bool {
    let started = tokio::time::Instant::now();
    loop {
        if cond() {
            return true;
        }
        if started.elapsed() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Service that counts its work steps.
pub struct Counting {
    name: &'static str,
    pub steps: Arc<AtomicU64>,
}

impl Counting {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Service for Counting {
    fn name(&self) -> &str {
        self.name
    }

    async fn work_step(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        self.steps.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Service whose every step fails.
pub struct Flaky {
    name: &'static str,
    pub attempts: Arc<AtomicU64>,
    fatal: bool,
}

impl Flaky {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attempts: Arc::new(AtomicU64::new(0)),
            fatal: false,
        }
    }

    pub fn fatal(name: &'static str) -> Self {
        Self {
            name,
            attempts: Arc::new(AtomicU64::new(0)),
            fatal: true,
        }
    }
}

#[async_trait]
impl Service for Flaky {
    fn name(&self) -> &str {
        self.name
    }

    async fn work_step(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if self.fatal {
            Err(ServiceError::fatal("wedged"))
        } else {
            Err(ServiceError::failed("boom"))
        }
    }
}

/// Service whose step panics; the worker must survive it.
pub struct Panicking {
    name: &'static str,
}

impl Panicking {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl Service for Panicking {
    fn name(&self) -> &str {
        self.name
    }

    async fn work_step(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        panic!("worker must outlive this");
    }
}

/// Message-driven service that records the string payloads it handles.
pub struct Recording {
    name: &'static str,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl Recording {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("seen list poisoned").clone()
    }
}

#[async_trait]
impl Service for Recording {
    fn name(&self) -> &str {
        self.name
    }

    async fn handle(&self, envelope: Envelope, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        let payload = match envelope.downcast::<Parsed>() {
            Ok(parsed) => parsed.0,
            Err(envelope) => envelope
                .downcast::<Raw>()
                .map(|raw| raw.0)
                .map_err(|_| ServiceError::failed("unexpected payload type"))?,
        };
        self.seen.lock().expect("seen list poisoned").push(payload);
        Ok(())
    }
}

/// Transforms every `Raw` payload and forwards it to `target`.
pub struct Forwarding {
    name: &'static str,
    target: &'static str,
}

impl Forwarding {
    pub fn new(name: &'static str, target: &'static str) -> Self {
        Self { name, target }
    }
}

#[async_trait]
impl Service for Forwarding {
    fn name(&self) -> &str {
        self.name
    }

    async fn handle(&self, envelope: Envelope, ctx: &ServiceContext) -> Result<(), ServiceError> {
        let raw = envelope
            .downcast::<Raw>()
            .map_err(|_| ServiceError::failed("expected a Raw payload"))?;
        ctx.send(self.target, Envelope::new(Parsed(format!("{}!", raw.0))))
            .map_err(|e| ServiceError::failed(e.to_string()))
    }
}

/// Runs one successful step, then reports itself complete.
pub struct OneShot {
    name: &'static str,
    done: AtomicBool,
    pub cleanups: Arc<AtomicU64>,
}

impl OneShot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            done: AtomicBool::new(false),
            cleanups: Arc::new(AtomicU64::new(0)),
        }
    }
}

#[async_trait]
impl Service for OneShot {
    fn name(&self) -> &str {
        self.name
    }

    async fn work_step(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        self.done.store(true, Ordering::Release);
        Ok(())
    }

    async fn cleanup(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        self.cleanups.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn is_complete(&self, _ctx: &ServiceContext) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

/// Records the order of lifecycle callbacks it observes.
pub struct Tracing {
    name: &'static str,
    pub calls: Arc<Mutex<Vec<String>>>,
    fail_setup: bool,
}

impl Tracing {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_setup: false,
        }
    }

    pub fn failing_setup(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_setup: true,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("call list poisoned").clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("call list poisoned").push(call.into());
    }
}

#[async_trait]
impl Service for Tracing {
    fn name(&self) -> &str {
        self.name
    }

    async fn setup(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        self.record("setup");
        if self.fail_setup {
            Err(ServiceError::failed("setup refused"))
        } else {
            Ok(())
        }
    }

    async fn work_step(&self, _ctx: &ServiceContext) -> Result<(), ServiceError> {
        self.record("step");
        Ok(())
    }

    async fn cleanup(&self, ctx: &ServiceContext) -> Result<(), ServiceError> {
        self.record(format!("cleanup(running={})", ctx.is_running()));
        Ok(())
    }
}
