//! Integration tests for the worker tick loop: pacing, quarantine, and
//! knob validation.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use servitor::{Config, Envelope, Placement, Scheduler, ServiceSpec};

use common::{wait_until, Counting, Flaky, Panicking, Raw, Recording};

fn config(workers: usize, tick_ms: u64) -> Config {
    let mut cfg = Config::default();
    cfg.max_workers = workers;
    cfg.tick = Duration::from_millis(tick_ms);
    cfg
}

fn spec(service: impl servitor::Service, period: Duration) -> ServiceSpec {
    ServiceSpec::new(Arc::new(service), period, Placement::Any, 256)
}

#[tokio::test]
async fn pacing_respects_service_period() {
    let scheduler = Scheduler::new(config(1, 10), Vec::new());
    let counting = Counting::new("paced");
    let steps = Arc::clone(&counting.steps);
    scheduler
        .register(spec(counting, Duration::from_millis(100)))
        .expect("register");
    scheduler.start_all();

    tokio::time::sleep(Duration::from_millis(350)).await;
    scheduler.stop_all().await.expect("graceful stop");

    let observed = steps.load(Ordering::Relaxed);
    assert!(
        (2..=5).contains(&observed),
        "period 100ms over ~350ms should step ~4 times, got {observed}"
    );
}

#[tokio::test]
async fn tick_floors_the_effective_period() {
    // period = 1ms with tick = 50ms: cadence is the tick, not the period.
    let scheduler = Scheduler::new(config(1, 50), Vec::new());
    let counting = Counting::new("eager");
    let steps = Arc::clone(&counting.steps);
    scheduler
        .register(spec(counting, Duration::from_millis(1)))
        .expect("register");
    scheduler.start_all();

    tokio::time::sleep(Duration::from_millis(260)).await;
    scheduler.stop_all().await.expect("graceful stop");

    let observed = steps.load(Ordering::Relaxed);
    assert!(
        (2..=7).contains(&observed),
        "1ms period under a 50ms tick should step ~5 times, got {observed}"
    );
}

#[tokio::test]
async fn huge_period_steps_once_without_stalling_the_worker() {
    let scheduler = Scheduler::new(config(1, 10), Vec::new());
    let glacial = Counting::new("glacial");
    let glacial_steps = Arc::clone(&glacial.steps);
    let busy = Counting::new("busy");
    let busy_steps = Arc::clone(&busy.steps);
    scheduler
        .register(spec(glacial, Duration::from_secs(1_000)))
        .expect("register glacial");
    scheduler
        .register(spec(busy, Duration::from_millis(10)))
        .expect("register busy");
    scheduler.start_all();

    tokio::time::sleep(Duration::from_millis(300)).await;
    scheduler.stop_all().await.expect("graceful stop");

    assert!(
        glacial_steps.load(Ordering::Relaxed) <= 1,
        "a 1000s period must not recur within the test window"
    );
    assert!(
        busy_steps.load(Ordering::Relaxed) >= 2,
        "the worker must stay responsive to its other services"
    );
}

#[tokio::test]
async fn auto_quarantine_after_three_consecutive_failures() {
    let scheduler = Scheduler::new(config(1, 10), Vec::new());
    let flaky = Flaky::new("flaky");
    let attempts = Arc::clone(&flaky.attempts);
    scheduler
        .register(spec(flaky, Duration::from_millis(10)))
        .expect("register");
    scheduler.start_all();

    let quarantined = wait_until(Duration::from_millis(500), || {
        scheduler.get("flaky").is_some_and(|cell| !cell.is_running())
    })
    .await;
    assert!(quarantined, "service never got quarantined");
    // The worker stops the service the moment the streak hits the
    // threshold; no further attempts happen.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(attempts.load(Ordering::Relaxed), 3);

    let metrics = scheduler.all_metrics();
    assert_eq!(metrics["flaky"].error_count, 3);
    assert_eq!(metrics["flaky"].consecutive_errors, 3);
    assert_eq!(metrics["flaky"].step_count, 0);

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn threshold_of_one_quarantines_on_first_failure() {
    let mut cfg = config(1, 10);
    cfg.error_threshold = 1;
    let scheduler = Scheduler::new(cfg, Vec::new());
    let flaky = Flaky::new("fragile");
    let attempts = Arc::clone(&flaky.attempts);
    scheduler
        .register(spec(flaky, Duration::from_millis(10)))
        .expect("register");
    scheduler.start_all();

    let quarantined = wait_until(Duration::from_millis(500), || {
        scheduler.get("fragile").is_some_and(|cell| !cell.is_running())
    })
    .await;
    assert!(quarantined);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(attempts.load(Ordering::Relaxed), 1);

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn fatal_error_skips_the_threshold() {
    let scheduler = Scheduler::new(config(1, 10), Vec::new());
    let flaky = Flaky::fatal("wedged");
    let attempts = Arc::clone(&flaky.attempts);
    scheduler
        .register(spec(flaky, Duration::from_millis(10)))
        .expect("register");
    scheduler.start_all();

    let quarantined = wait_until(Duration::from_millis(500), || {
        scheduler.get("wedged").is_some_and(|cell| !cell.is_running())
    })
    .await;
    assert!(quarantined);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(
        attempts.load(Ordering::Relaxed),
        1,
        "a fatal failure must quarantine on the spot"
    );

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn panicking_callback_is_contained() {
    let scheduler = Scheduler::new(config(1, 10), Vec::new());
    let survivor = Counting::new("survivor");
    let survivor_steps = Arc::clone(&survivor.steps);
    scheduler
        .register(spec(Panicking::new("bomb"), Duration::from_millis(10)))
        .expect("register bomb");
    scheduler
        .register(spec(survivor, Duration::from_millis(10)))
        .expect("register survivor");
    scheduler.start_all();

    let quarantined = wait_until(Duration::from_millis(500), || {
        scheduler.get("bomb").is_some_and(|cell| !cell.is_running())
    })
    .await;
    assert!(quarantined, "the panic must be converted into quarantine");

    let before = survivor_steps.load(Ordering::Relaxed);
    let progressed = wait_until(Duration::from_millis(300), || {
        survivor_steps.load(Ordering::Relaxed) > before
    })
    .await;
    assert!(progressed, "the worker must keep driving its other services");

    let metrics = scheduler.all_metrics();
    assert_eq!(metrics["bomb"].step_count, 0);
    assert!(metrics["bomb"].error_count >= 1);

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn knob_setters_reject_non_positive_values() {
    let scheduler = Scheduler::new(config(1, 50), Vec::new());
    let worker = &scheduler.workers()[0];

    assert_eq!(worker.tick(), Duration::from_millis(50));
    worker.set_tick(Duration::ZERO);
    assert_eq!(worker.tick(), Duration::from_millis(50), "zero is rejected");
    worker.set_tick(Duration::from_millis(20));
    assert_eq!(worker.tick(), Duration::from_millis(20));

    assert_eq!(worker.error_threshold(), 3);
    worker.set_error_threshold(0);
    assert_eq!(worker.error_threshold(), 3, "zero is rejected");
    worker.set_error_threshold(5);
    assert_eq!(worker.error_threshold(), 5);
}

#[tokio::test]
async fn single_producer_messages_arrive_in_offer_order() {
    let scheduler = Scheduler::new(config(1, 10), Vec::new());
    let recorder = Recording::new("sink");
    let seen = Arc::clone(&recorder.seen);
    scheduler
        .register(spec(recorder, Duration::from_millis(10)))
        .expect("register");
    scheduler.start_all();

    let expected: Vec<String> = (0..50).map(|i| format!("m{i}")).collect();
    for payload in &expected {
        scheduler
            .send("sink", Envelope::new(Raw(payload.clone())))
            .expect("inbox has room");
    }

    let drained = wait_until(Duration::from_millis(500), || {
        seen.lock().unwrap().len() == expected.len()
    })
    .await;
    assert!(drained, "all messages should be handled");
    assert_eq!(*seen.lock().unwrap(), expected);

    scheduler.stop_all().await.expect("graceful stop");
}
