//! Integration tests for the scheduler facade: placement, routing,
//! aggregation, and shutdown.

mod common;

use std::sync::Arc;
use std::time::Duration;

use servitor::{
    Config, Envelope, Placement, RouteError, RuntimeError, Scheduler, ServiceSpec,
};

use common::{wait_until, Counting, Forwarding, Raw, Recording};

fn config(workers: usize, tick_ms: u64) -> Config {
    let mut cfg = Config::default();
    cfg.max_workers = workers;
    cfg.tick = Duration::from_millis(tick_ms);
    cfg
}

fn spec(service: impl servitor::Service, period_ms: u64) -> ServiceSpec {
    ServiceSpec::new(
        Arc::new(service),
        Duration::from_millis(period_ms),
        Placement::Any,
        256,
    )
}

#[tokio::test]
async fn routes_between_services() {
    let scheduler = Scheduler::new(config(2, 10), Vec::new());
    let recorder = Recording::new("B");
    let seen = Arc::clone(&recorder.seen);

    scheduler
        .register(spec(Forwarding::new("A", "B"), 20))
        .expect("register A");
    scheduler.register(spec(recorder, 20)).expect("register B");
    scheduler.start_all();

    scheduler
        .send("A", Envelope::new(Raw("x".into())))
        .expect("A is registered with a fresh inbox");

    let delivered = wait_until(Duration::from_millis(200), || {
        !seen.lock().unwrap().is_empty()
    })
    .await;
    assert!(delivered, "B never received the forwarded message");
    assert_eq!(*seen.lock().unwrap(), vec!["x!".to_string()]);

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn pinned_placement_lands_on_requested_worker() {
    let scheduler = Scheduler::new(config(4, 50), Vec::new());
    scheduler
        .register(ServiceSpec::new(
            Arc::new(Counting::new("pinned")),
            Duration::from_millis(20),
            Placement::Pinned(2),
            16,
        ))
        .expect("register pinned");

    for (index, worker) in scheduler.workers().iter().enumerate() {
        let names = worker.service_names();
        if index == 2 {
            assert_eq!(names, vec!["pinned".to_string()]);
        } else {
            assert!(names.is_empty(), "worker {index} should be empty");
        }
    }
}

#[tokio::test]
async fn least_loaded_placement_balances_evenly() {
    let scheduler = Scheduler::new(config(3, 50), Vec::new());
    let names = ["s0", "s1", "s2", "s3", "s4", "s5"];
    for name in names {
        scheduler
            .register(spec(Counting::new(name), 20))
            .expect("register");
    }
    for worker in scheduler.workers() {
        assert_eq!(worker.len(), 2, "worker {} is unbalanced", worker.id());
    }
}

#[tokio::test]
async fn out_of_range_pin_falls_back_to_least_loaded() {
    let scheduler = Scheduler::new(config(2, 50), Vec::new());
    scheduler
        .register(ServiceSpec::new(
            Arc::new(Counting::new("stray")),
            Duration::from_millis(20),
            Placement::Pinned(17),
            16,
        ))
        .expect("register despite bad pin");

    let total: usize = scheduler.workers().iter().map(|w| w.len()).sum();
    assert_eq!(total, 1);
    assert_eq!(scheduler.workers()[0].len(), 1, "lowest index wins ties");
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let scheduler = Scheduler::new(config(2, 50), Vec::new());
    scheduler
        .register(spec(Counting::new("dup"), 20))
        .expect("first registration");
    let err = scheduler
        .register(spec(Counting::new("dup"), 20))
        .expect_err("second registration must fail");
    assert!(matches!(
        err,
        RuntimeError::ServiceAlreadyExists { ref name } if name == "dup"
    ));
    // The original registration is untouched.
    assert!(scheduler.get("dup").is_some());
    let total: usize = scheduler.workers().iter().map(|w| w.len()).sum();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn routing_failures_are_typed() {
    let scheduler = Scheduler::new(config(1, 50), Vec::new());
    assert!(matches!(
        scheduler.send("", Envelope::new(Raw("x".into()))),
        Err(RouteError::EmptyTarget)
    ));
    assert!(matches!(
        scheduler.send("ghost", Envelope::new(Raw("x".into()))),
        Err(RouteError::UnknownTarget { .. })
    ));
}

#[tokio::test]
async fn inbox_overflow_drops_fifth_message_and_keeps_order() {
    let scheduler = Scheduler::new(config(1, 10), Vec::new());
    let recorder = Recording::new("sink");
    let seen = Arc::clone(&recorder.seen);
    scheduler
        .register(ServiceSpec::new(
            Arc::new(recorder),
            Duration::from_millis(10),
            Placement::Any,
            4,
        ))
        .expect("register sink");

    // No consumer is running yet; the inbox fills up.
    for i in 0..4 {
        scheduler
            .send("sink", Envelope::new(Raw(format!("m{i}"))))
            .expect("inbox has room");
    }
    assert!(matches!(
        scheduler.send("sink", Envelope::new(Raw("m4".into()))),
        Err(RouteError::InboxFull { .. })
    ));
    assert_eq!(
        scheduler.get("sink").expect("registered").inbox_len(),
        4,
        "the rejected message must not occupy a slot"
    );

    scheduler.start_all();
    let drained = wait_until(Duration::from_millis(300), || {
        seen.lock().unwrap().len() == 4
    })
    .await;
    assert!(drained, "consumer never drained the inbox");
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["m0", "m1", "m2", "m3"],
        "messages must be handled in offer order and the dropped one must stay dropped"
    );

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn status_log_reports_non_empty_workers() {
    let scheduler = Scheduler::new(config(2, 50), Vec::new());
    scheduler
        .register(ServiceSpec::new(
            Arc::new(Counting::new("a")),
            Duration::from_millis(20),
            Placement::Pinned(0),
            16,
        ))
        .expect("register a");
    scheduler
        .register(ServiceSpec::new(
            Arc::new(Counting::new("b")),
            Duration::from_millis(20),
            Placement::Pinned(0),
            16,
        ))
        .expect("register b");

    let status = scheduler.status_log();
    assert_eq!(
        status.get(&0).map(String::as_str),
        Some("worker-0 manages 2 services: [a, b]")
    );
    assert!(!status.contains_key(&1), "empty workers are omitted");
}

#[tokio::test]
async fn all_metrics_aggregates_across_workers() {
    let scheduler = Scheduler::new(config(2, 10), Vec::new());
    let left = Counting::new("left");
    let right = Counting::new("right");
    let left_steps = Arc::clone(&left.steps);
    let right_steps = Arc::clone(&right.steps);
    scheduler.register(spec(left, 10)).expect("register left");
    scheduler.register(spec(right, 10)).expect("register right");
    scheduler.start_all();

    let stepped = wait_until(Duration::from_millis(500), || {
        left_steps.load(std::sync::atomic::Ordering::Relaxed) > 0
            && right_steps.load(std::sync::atomic::Ordering::Relaxed) > 0
    })
    .await;
    assert!(stepped, "both services should have stepped");

    let metrics = scheduler.all_metrics();
    assert!(metrics["left"].step_count >= 1);
    assert!(metrics["right"].step_count >= 1);
    assert_eq!(metrics["left"].error_count, 0);

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn stop_all_joins_every_worker() {
    let scheduler = Scheduler::new(config(3, 10), Vec::new());
    scheduler
        .register(spec(Counting::new("ticker"), 10))
        .expect("register");
    scheduler.start_all();
    tokio::time::sleep(Duration::from_millis(50)).await;

    scheduler.stop_all().await.expect("within grace");
    for worker in scheduler.workers() {
        assert!(worker.has_exited(), "worker {} still running", worker.id());
    }
    // A second stop is a no-op that still reports success.
    scheduler.stop_all().await.expect("idempotent stop");
}

#[tokio::test]
async fn quarantine_is_visible_on_the_event_stream() {
    use servitor::EventKind;

    let scheduler = Scheduler::new(config(1, 10), Vec::new());
    let mut events = scheduler.subscribe();
    scheduler
        .register(spec(common::Flaky::new("flaky"), 10))
        .expect("register");
    scheduler.start_all();

    let saw_quarantine = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await {
                Ok(ev) if ev.kind == EventKind::ServiceQuarantined => {
                    assert_eq!(ev.service.as_deref(), Some("flaky"));
                    assert_eq!(ev.streak, Some(3));
                    break;
                }
                Ok(_) => continue,
                Err(_) => panic!("event stream closed early"),
            }
        }
    })
    .await;
    assert!(saw_quarantine.is_ok(), "no ServiceQuarantined event seen");

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn attached_subscribers_receive_events() {
    use async_trait::async_trait;
    use servitor::{Event, EventKind, Subscribe};
    use std::sync::Mutex;

    struct KindCollector {
        kinds: Arc<Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Subscribe for KindCollector {
        async fn on_event(&self, event: &Event) {
            self.kinds.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "kind-collector"
        }
    }

    let kinds = Arc::new(Mutex::new(Vec::new()));
    let collector = KindCollector {
        kinds: Arc::clone(&kinds),
    };
    let scheduler = Scheduler::new(config(1, 10), vec![Arc::new(collector) as Arc<dyn Subscribe>]);
    scheduler
        .register(spec(Counting::new("observed"), 10))
        .expect("register");
    scheduler.start_all();

    let seen = wait_until(Duration::from_millis(500), || {
        let kinds = kinds.lock().unwrap();
        kinds.contains(&EventKind::ServiceRegistered) && kinds.contains(&EventKind::WorkerStarted)
    })
    .await;
    assert!(seen, "subscriber should observe registration and worker start");

    scheduler.stop_all().await.expect("graceful stop");
}

#[tokio::test]
async fn zero_max_workers_is_clamped() {
    let scheduler = Scheduler::new(config(0, 50), Vec::new());
    assert!(!scheduler.workers().is_empty());
    assert!(scheduler.config().max_workers >= 1);
}
