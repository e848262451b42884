//! # Global runtime configuration.
//!
//! [`Config`] defines the scheduler's behavior: worker pool size, worker
//! tick period, auto-quarantine threshold, default service period, inbox
//! and event-bus capacities, and the shutdown grace period.
//!
//! Parsing external configuration (JSON and friends) is out of scope; the
//! embedding application builds a `Config` and hands it to
//! [`Scheduler::new`](crate::Scheduler::new). Invalid values never abort
//! construction: [`Config::normalized`] clamps them to defaults and reports
//! what changed so the scheduler can publish `ConfigAdjusted` diagnostics.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use servitor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.tick = Duration::from_millis(20);
//! cfg.error_threshold = 5;
//!
//! let (cfg, adjusted) = cfg.normalized();
//! assert!(adjusted.is_empty());
//! assert_eq!(cfg.tick, Duration::from_millis(20));
//! ```

use std::time::Duration;

/// Global configuration for the scheduler and its worker pool.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of workers in the pool. `0` means "one per hardware thread";
    /// values above the hardware thread count are clamped down.
    pub max_workers: usize,
    /// Polling quantum of each worker.
    pub tick: Duration,
    /// Consecutive step failures after which a service is auto-quarantined.
    pub error_threshold: u32,
    /// Period substituted for services registered with a zero period.
    pub default_period: Duration,
    /// Inbox capacity substituted for services registered with a zero
    /// capacity.
    pub inbox_capacity: usize,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Maximum time `stop_all` waits for workers to exit.
    pub grace: Duration,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `max_workers = 1`
    /// - `tick = 50ms`
    /// - `error_threshold = 3`
    /// - `default_period = 10ms`
    /// - `inbox_capacity = 256`
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            max_workers: 1,
            tick: Duration::from_millis(50),
            error_threshold: 3,
            default_period: Duration::from_millis(10),
            inbox_capacity: 256,
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Returns a copy with every invalid field clamped to its default,
    /// together with the labels of the fields that were adjusted.
    ///
    /// - `max_workers` of zero, or larger than the hardware thread count,
    ///   becomes the hardware thread count;
    /// - zero durations and zero capacities become their defaults.
    pub fn normalized(&self) -> (Config, Vec<&'static str>) {
        let defaults = Config::default();
        let mut cfg = self.clone();
        let mut adjusted = Vec::new();

        let hardware = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        if cfg.max_workers == 0 || cfg.max_workers > hardware {
            cfg.max_workers = hardware;
            adjusted.push("max_workers_clamped");
        }
        if cfg.tick.is_zero() {
            cfg.tick = defaults.tick;
            adjusted.push("tick_clamped");
        }
        if cfg.error_threshold == 0 {
            cfg.error_threshold = defaults.error_threshold;
            adjusted.push("error_threshold_clamped");
        }
        if cfg.default_period.is_zero() {
            cfg.default_period = defaults.default_period;
            adjusted.push("default_period_clamped");
        }
        if cfg.inbox_capacity == 0 {
            cfg.inbox_capacity = defaults.inbox_capacity;
            adjusted.push("inbox_capacity_clamped");
        }
        if cfg.bus_capacity == 0 {
            cfg.bus_capacity = defaults.bus_capacity;
            adjusted.push("bus_capacity_clamped");
        }
        if cfg.grace.is_zero() {
            cfg.grace = defaults.grace;
            adjusted.push("grace_clamped");
        }

        (cfg, adjusted)
    }
}
